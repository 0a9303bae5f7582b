pub mod favorite;
pub mod indexer;
pub mod listing;
pub mod profile;
pub mod purchase;
pub mod subscription;

pub use favorite::{Favorite, NewFavorite};
pub use indexer::{IndexerState, NewIndexerState};
pub use listing::{Listing, NewListing};
pub use profile::{NewProfile, Profile, UpdateProfile};
pub use purchase::{NewPurchase, Purchase};
pub use subscription::{NewSubscription, Subscription};
