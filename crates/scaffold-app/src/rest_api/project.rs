use scaffold_dal::project::ProjectAttributes;

use super::{crud::CrudController, route::CrudRoute};

pub const ROUTE_NAME: &str = "ProjectRoute";

pub type ProjectController = CrudController<ProjectAttributes>;

pub fn route() -> CrudRoute<ProjectAttributes> {
    CrudRoute::new(ROUTE_NAME, ProjectController::new())
}
