mod handler;
mod model;

pub use handler::{
    delete_comment, delete_recipe, delete_user, list_comments, list_recipes, list_users,
    update_user,
};
