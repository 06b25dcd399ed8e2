//! JSON:API shaped documents exchanged over the REST interface.
//!
//! Successful responses are `{links: {self}, data}`, where `data` is either a
//! single [`ResourceObject`] or a list of them. Failures are a single
//! [`ErrorObject`] or a list of them (one per violated constraint).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<D> {
    pub links: Links,
    pub data: D,
}

impl<D> Document<D> {
    pub fn new(self_link: impl Into<String>, data: D) -> Self {
        Document {
            links: Links {
                self_link: self_link.into(),
            },
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject<A> {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub attributes: A,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub status: u16,
    pub title: String,
    pub detail: String,
}
