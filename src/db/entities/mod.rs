//! SeaORM entities mapping the application's tables.

pub mod account;
pub mod message_template;
pub mod message_template_tag;
pub mod tag;

pub mod prelude {
    pub use super::account::Entity as Account;
    pub use super::message_template_tag::Entity as MessageTemplateTag;
}
