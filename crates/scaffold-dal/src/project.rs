use garde::Validate;
use scaffold_macros::Entity;
use serde::{Deserialize, Serialize};

use crate::{
    Record, Repository,
    validation::{is_string, iso8601, length, not_empty, positive},
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, Validate, Entity)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAttributes {
    #[garde(custom(is_string), custom(not_empty), custom(length(2, 30)))]
    pub name: Option<String>,
    #[garde(custom(is_string))]
    pub description: Option<String>,
    #[garde(custom(iso8601), custom(not_empty))]
    pub start_date: Option<String>,
    #[garde(custom(iso8601), custom(not_empty))]
    pub end_date: Option<String>,
    #[garde(custom(crate::validation::email), custom(not_empty))]
    pub email: Option<String>,
    #[garde(custom(positive))]
    pub team_size: Option<i64>,
}

pub type Project = Record<ProjectAttributes>;

pub type ProjectRepository<'c> = Repository<'c, ProjectAttributes>;
