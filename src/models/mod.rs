mod recipe;
mod social;
mod user;

pub use recipe::{
    AdminRecipeSummary, NewRecipe, Recipe, RecipePatch, RecipeSearchHit, RecipeShare,
    RecipeStatus, RecipeWithOwner, SearchFilter, ShareEntry, VisibleRecipe,
};
pub(crate) use recipe::{non_empty, recipe_matches_text};
pub use social::{
    AdminCommentView, Comment, CommentView, Friend, FriendEntry, FriendRequest, FriendStatus,
    IncomingRequest, LikeStatus, Notification, NotificationType, NotificationView,
};
pub use user::{Identity, Role, User, UserBrief, UserSummary};
