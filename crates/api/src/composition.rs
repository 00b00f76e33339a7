use envdash_core::{DashError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A service composition as produced by the backend composer.
///
/// Only the fields the dashboard reads are typed; everything else is kept in
/// `extra` so that save / validate / execute send the object back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition_id: Option<String>,
    /// Numeric or string id, depending on the backend store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_plan: Option<Prose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<Prose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints_satisfied: Option<Prose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Composition {
    /// Heading shown for the composition.
    pub fn title(&self) -> String {
        if let Some(id) = self.composition_id.as_deref().filter(|s| !s.is_empty()) {
            return id.to_string();
        }
        match &self.id {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "unnamed composition".to_string(),
        }
    }

    /// Identifier usable with `GET /api/compositions/{id}`.
    pub fn lookup_id(&self) -> Option<String> {
        match &self.id {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => self.composition_id.clone().filter(|s| !s.is_empty()),
        }
    }

    /// Turn an `{error: ...}` payload into [`DashError::Composition`].
    pub fn into_checked(self) -> Result<Self> {
        match self.error {
            Some(e) => Err(DashError::Composition(e)),
            None => Ok(self),
        }
    }
}

/// One service taking part in a composition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A field the composer emits either as free text or as a list of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prose {
    Text(String),
    List(Vec<Value>),
    Other(Value),
}

impl Prose {
    /// List items as display strings; a single text is a one-item list.
    pub fn items(&self) -> Vec<String> {
        match self {
            Prose::Text(s) => vec![s.clone()],
            Prose::List(items) => items.iter().map(item_text).collect(),
            Prose::Other(v) => vec![item_text(v)],
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Prose::List(_))
    }
}

impl std::fmt::Display for Prose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.items().join("\n"))
    }
}

fn item_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `POST /api/compositions/validate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidationResult {
    pub valid:   bool,
    pub message: Option<String>,
}

/// `POST /api/compositions/execute`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: Option<String>,
}

/// `POST /api/compositions/simulate`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulationResult {
    pub simulation_log: Option<Prose>,
}

/// `POST /api/compositions/save`; only the error field matters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaveResult {
    pub error: Option<String>,
}
