mod handler;
mod model;

pub use handler::{
    add_comment, create_recipe, delete_comment, delete_recipe, favorite, get_recipe, like,
    like_status, list_comments, list_favorites, list_recipes, list_shares, public_feed, search,
    share_recipe, unfavorite, unlike, unshare_recipe, update_recipe,
};
