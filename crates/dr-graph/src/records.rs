//! Fragment schema: JSON payload → typed node and edge records.
//!
//! # Node fragment
//!
//! ```json
//! [
//!   {"id": 101, "x": -0.3763, "y": 39.4699, "zona": "A"},
//!   {"id": "p-7", "x": -0.3790, "y": 39.4702}
//! ]
//! ```
//!
//! # Edge fragment
//!
//! ```json
//! [
//!   {"origen": 101, "destino": "p-7", "costo_total": 3.2, "tiempo": 41.0, "distancia": 120.5}
//! ]
//! ```
//!
//! Decoding happens in two steps.  The payload must parse as a JSON array
//! ([`GraphError::Decode`] otherwise); each element is then validated on its
//! own ([`GraphError::MalformedFragment`] names the fragment and the record
//! index).  Attributes other than the key fields are kept verbatim.

use serde_json::{Map, Value};

use dr_core::{Criterion, GeoPoint, NodeKey};

use crate::{GraphError, GraphResult};

/// Field names used by the fragment files.
pub mod fields {
    pub const NODE_ID:     &str = "id";
    pub const X:           &str = "x";
    pub const Y:           &str = "y";
    pub const ORIGIN:      &str = "origen";
    pub const DESTINATION: &str = "destino";
}

/// Free-form attributes carried alongside a node or edge.
pub type Attributes = Map<String, Value>;

// ── Records ───────────────────────────────────────────────────────────────────

/// One validated node record.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub key:   NodeKey,
    /// `Some` only when both `x` and `y` are present and numeric.
    pub pos:   Option<GeoPoint>,
    /// Every field of the source record except `id`.
    pub attrs: Attributes,
}

impl NodeRecord {
    /// Record with coordinates and no extra attributes.
    pub fn at(key: impl Into<NodeKey>, pos: GeoPoint) -> Self {
        let mut attrs = Attributes::new();
        attrs.insert(fields::X.into(), Value::from(pos.lon));
        attrs.insert(fields::Y.into(), Value::from(pos.lat));
        Self { key: key.into(), pos: Some(pos), attrs }
    }

    /// Record with no coordinates and no attributes.
    pub fn bare(key: impl Into<NodeKey>) -> Self {
        Self { key: key.into(), pos: None, attrs: Attributes::new() }
    }
}

/// Optional per-criterion weights of one edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeWeights {
    pub cost:     Option<f64>,
    pub time:     Option<f64>,
    pub distance: Option<f64>,
}

impl EdgeWeights {
    pub fn new(cost: f64, time: f64, distance: f64) -> Self {
        Self { cost: Some(cost), time: Some(time), distance: Some(distance) }
    }

    #[inline]
    pub fn get(&self, criterion: Criterion) -> Option<f64> {
        match criterion {
            Criterion::Cost     => self.cost,
            Criterion::Time     => self.time,
            Criterion::Distance => self.distance,
        }
    }

    fn slot(&mut self, criterion: Criterion) -> &mut Option<f64> {
        match criterion {
            Criterion::Cost     => &mut self.cost,
            Criterion::Time     => &mut self.time,
            Criterion::Distance => &mut self.distance,
        }
    }
}

/// One validated edge record.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub origin:      NodeKey,
    pub destination: NodeKey,
    pub weights:     EdgeWeights,
    /// Every field of the source record except `origen` and `destino`.
    pub attrs:       Attributes,
}

impl EdgeRecord {
    /// Record with all three weights set and matching attributes.
    pub fn weighted(
        origin:      impl Into<NodeKey>,
        destination: impl Into<NodeKey>,
        weights:     EdgeWeights,
    ) -> Self {
        let mut attrs = Attributes::new();
        for c in Criterion::ALL {
            if let Some(w) = weights.get(c) {
                attrs.insert(c.field().into(), Value::from(w));
            }
        }
        Self { origin: origin.into(), destination: destination.into(), weights, attrs }
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decode a node fragment payload named `fragment` (used in error messages).
pub fn decode_node_fragment(fragment: &str, payload: &[u8]) -> GraphResult<Vec<NodeRecord>> {
    decode_array(fragment, payload)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            node_record(value).map_err(|reason| GraphError::MalformedFragment {
                fragment: fragment.to_owned(),
                index,
                reason,
            })
        })
        .collect()
}

/// Decode an edge fragment payload named `fragment`.
pub fn decode_edge_fragment(fragment: &str, payload: &[u8]) -> GraphResult<Vec<EdgeRecord>> {
    decode_array(fragment, payload)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            edge_record(value).map_err(|reason| GraphError::MalformedFragment {
                fragment: fragment.to_owned(),
                index,
                reason,
            })
        })
        .collect()
}

fn decode_array(fragment: &str, payload: &[u8]) -> GraphResult<Vec<Value>> {
    serde_json::from_slice::<Vec<Value>>(payload).map_err(|source| GraphError::Decode {
        fragment: fragment.to_owned(),
        source,
    })
}

// ── Per-record validation ─────────────────────────────────────────────────────

fn node_record(value: Value) -> Result<NodeRecord, String> {
    let mut attrs = into_object(value)?;
    let key = take_key(&mut attrs, fields::NODE_ID)?;

    let x = number(&attrs, fields::X)?;
    let y = number(&attrs, fields::Y)?;
    let pos = match (x, y) {
        (Some(x), Some(y)) => Some(GeoPoint::from_xy(x, y)),
        _ => None,
    };

    Ok(NodeRecord { key, pos, attrs })
}

fn edge_record(value: Value) -> Result<EdgeRecord, String> {
    let mut attrs = into_object(value)?;
    let origin      = take_key(&mut attrs, fields::ORIGIN)?;
    let destination = take_key(&mut attrs, fields::DESTINATION)?;

    let mut weights = EdgeWeights::default();
    for c in Criterion::ALL {
        *weights.slot(c) = weight(&attrs, c.field())?;
    }

    Ok(EdgeRecord { origin, destination, weights, attrs })
}

fn into_object(value: Value) -> Result<Attributes, String> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected an object, found {}", kind(&other))),
    }
}

fn take_key(attrs: &mut Attributes, field: &str) -> Result<NodeKey, String> {
    match attrs.remove(field) {
        None => Err(format!("missing required field `{field}`")),
        Some(Value::String(s)) => Ok(NodeKey::Str(s)),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(NodeKey::Int)
            .ok_or_else(|| format!("`{field}` must be an integer or a string, found {n}")),
        Some(other) => Err(format!(
            "`{field}` must be an integer or a string, found {}",
            kind(&other)
        )),
    }
}

/// Absent or `null` → `None`; any other non-number is an error.
fn number(attrs: &Attributes, field: &str) -> Result<Option<f64>, String> {
    match attrs.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("`{field}` is not representable as f64")),
        Some(other) => Err(format!("`{field}` must be a number, found {}", kind(other))),
    }
}

fn weight(attrs: &Attributes, field: &str) -> Result<Option<f64>, String> {
    match number(attrs, field)? {
        Some(w) if w < 0.0 => Err(format!("`{field}` must be non-negative, found {w}")),
        w => Ok(w),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}
