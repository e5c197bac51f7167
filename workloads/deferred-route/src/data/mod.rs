//! Data for the deferred route.

mod message;
mod person;

pub use message::*;
pub use person::*;

/// Value produced by any unit of the route's plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteValue {
    Person(Person),
    Message(String),
}

impl RouteValue {
    /// The person, if this value is one.
    pub fn as_person(&self) -> Option<&Person> {
        match self {
            Self::Person(person) => Some(person),
            Self::Message(_) => None,
        }
    }

    /// The message, if this value is one.
    pub fn as_message(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(message),
            Self::Person(_) => None,
        }
    }
}
