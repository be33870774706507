//! Store traits (ports)

mod repositories;

pub use repositories::{
    MessageRepository, NotificationRepository, RepoResult, UserProfile, UserRepository,
};
