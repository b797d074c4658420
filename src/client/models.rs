//! Wire models for the apolice REST backend
//!
//! Field names follow the backend's Portuguese vocabulary (`nome`, `valor`,
//! `ativo`); the structs carry Rust-side names where they differ.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A logical grouping of configurable fields (e.g. "APOLICE")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Module ID
    pub id: String,

    /// Module name, matched case-insensitively by the resolver
    pub nome: String,
}

/// A configurable field belonging to one module (e.g. "produto", "porte")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field configuration ID
    pub id: String,

    /// Field name, matched case-insensitively by the resolver
    pub nome: String,
}

/// One allowed value for a configurable field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicDatum {
    /// Datum ID
    pub id: String,

    /// Display value
    pub valor: String,

    /// Whether the value is offered to consumers; absent means active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

impl DynamicDatum {
    /// Absent `ativo` counts as active.
    pub fn is_active(&self) -> bool {
        self.ativo != Some(false)
    }
}

/// The resolved shape exposed to consumers: a produto or porte entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralValue {
    /// Originating dynamic-datum ID
    pub id: String,

    /// Display value
    pub valor: String,
}

impl From<DynamicDatum> for StructuralValue {
    fn from(datum: DynamicDatum) -> Self {
        Self {
            id: datum.id,
            valor: datum.valor,
        }
    }
}

/// Standard `{ "data": [...] }` response envelope.
///
/// A missing `data` field deserializes as an empty list, never an error.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Search responses arrive either enveloped or as a bare array depending
/// on the endpoint; accept both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Enveloped { #[serde(default)] data: Vec<Value> },
    Bare(Vec<Value>),
}

impl SearchResponse {
    pub fn into_items(self) -> Vec<Value> {
        match self {
            SearchResponse::Enveloped { data } => data,
            SearchResponse::Bare(items) => items,
        }
    }
}
