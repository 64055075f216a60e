mod handler;
mod model;

pub use handler::{
    accept_request, decline_request, incoming_requests, list_friends, remove_friend,
    send_request, status,
};
