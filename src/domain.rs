mod error_code;
mod form;
mod form_action;
mod list_member;
mod member_status;
mod submission;

pub use error_code::ErrorCode;
pub use form::*;
pub use form_action::FormAction;
pub use list_member::{EmailType, ListMember};
pub use member_status::MemberStatus;
pub use submission::*;
