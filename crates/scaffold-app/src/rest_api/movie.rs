use scaffold_dal::movie::MovieAttributes;

use super::{crud::CrudController, route::CrudRoute};

pub const ROUTE_NAME: &str = "MovieRoute";

pub type MovieController = CrudController<MovieAttributes>;

pub fn route() -> CrudRoute<MovieAttributes> {
    CrudRoute::new(ROUTE_NAME, MovieController::new())
}
