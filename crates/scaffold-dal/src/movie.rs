use garde::Validate;
use scaffold_macros::Entity;
use serde::{Deserialize, Serialize};

use crate::{Record, Repository};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, Validate, Entity)]
#[serde(rename_all = "camelCase")]
pub struct MovieAttributes {
    #[garde(required, length(chars, max = 100))]
    pub name: Option<String>,
    #[garde(required)]
    pub description: Option<String>,
    #[garde(required)]
    pub time: Option<i64>,
    #[garde(required)]
    pub views: Option<f64>,
    #[garde(required)]
    pub is_published: Option<bool>,
}

pub type Movie = Record<MovieAttributes>;

pub type MovieRepository<'c> = Repository<'c, MovieAttributes>;
