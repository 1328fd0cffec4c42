pub mod contact;

pub use contact::{ContactInput, ContactPatch, NewContact};
