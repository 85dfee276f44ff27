//! Gene types for NEAT genetic encodings.
//!
//! This module defines the fundamental building blocks of a genome:
//! - [`NeuronGene`]: a neuron, tagged with its [`NeuronType`]
//! - [`ConnectionGene`]: a link between two neurons, tagged with its [`ConnectionType`]
//!
//! Both carry a historical mark, an enabled flag and a named parameter set.
//! Connections refer to their endpoints by historical mark, not by reference,
//! so a gene can be moved between genomes without fixing up pointers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NeatError, Result};

/// The role of a neuron in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeuronType {
    /// Receives external values.
    Input,
    /// Produces network output.
    Output,
    /// Internal neuron added through mutation.
    Hidden,
    /// Constant-output neuron used for learnable biases.
    Bias,
}

impl NeuronType {
    /// Whether connections may terminate at this neuron.
    #[must_use]
    pub fn accepts_input(self) -> bool {
        matches!(self, NeuronType::Hidden | NeuronType::Output)
    }

    /// Whether connections may originate from this neuron.
    #[must_use]
    pub fn emits_output(self) -> bool {
        !matches!(self, NeuronType::Output)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NeuronType::Input => "input",
            NeuronType::Output => "output",
            NeuronType::Hidden => "hidden",
            NeuronType::Bias => "bias",
        }
    }
}

/// The kind of link a connection gene encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Feedforward link.
    Forward,
    /// Link that closes a cycle in the graph.
    Recurrent,
}

impl ConnectionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::Forward => "forward",
            ConnectionType::Recurrent => "recurrent",
        }
    }
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Named parameters of a gene.
///
/// Owned by value, so cloning a gene never aliases parameter state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a parameter. Absent names are an error, never a silent default.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::ParamNotFound`] if no parameter is named `name`.
    pub fn get(&self, name: &str) -> Result<&ParamValue> {
        self.0.get(name).ok_or_else(|| NeatError::ParamNotFound {
            name: name.to_owned(),
        })
    }

    /// Read a numeric parameter.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::ParamNotFound`] if absent, or
    /// [`NeatError::ParamType`] if the value is not a number.
    pub fn get_f64(&self, name: &str) -> Result<f64> {
        match self.get(name)? {
            ParamValue::Number(value) => Ok(*value),
            _ => Err(NeatError::ParamType {
                name: name.to_owned(),
                expected: "number",
            }),
        }
    }

    /// Insert or overwrite a parameter.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.0.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Behavior shared by both gene variants.
pub trait Gene {
    /// The global innovation number assigned when this gene was created.
    fn historical_mark(&self) -> u64;

    fn is_enabled(&self) -> bool;

    /// The gene's type tag as it appears in serialized form.
    fn type_name(&self) -> &'static str;

    fn params(&self) -> &Params;

    fn params_mut(&mut self) -> &mut Params;

    /// # Errors
    ///
    /// Returns [`NeatError::ParamNotFound`] if the parameter is absent.
    fn get_param(&self, name: &str) -> Result<&ParamValue> {
        self.params().get(name)
    }

    fn set_param(&mut self, name: &str, value: ParamValue) {
        self.params_mut().set(name, value);
    }
}

/// A neuron gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronGene {
    #[serde(rename = "type")]
    pub neuron_type: NeuronType,
    historical_mark: u64,
    pub enabled: bool,
    #[serde(default)]
    pub params: Params,
}

impl NeuronGene {
    /// Create an enabled neuron without parameters.
    #[must_use]
    pub fn new(neuron_type: NeuronType, historical_mark: u64) -> Self {
        Self {
            neuron_type,
            historical_mark,
            enabled: true,
            params: Params::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Gene for NeuronGene {
    fn historical_mark(&self) -> u64 {
        self.historical_mark
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn type_name(&self) -> &'static str {
        self.neuron_type.as_str()
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }
}

impl fmt::Display for NeuronGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NEAT neuron gene, mark: {}, type: {}",
            self.historical_mark,
            self.neuron_type.as_str()
        )
    }
}

/// A connection gene linking two neurons identified by historical mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGene {
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    pub mark_from: u64,
    pub mark_to: u64,
    historical_mark: u64,
    /// Disabled connections are preserved for crossover.
    pub enabled: bool,
    #[serde(default)]
    pub params: Params,
}

impl ConnectionGene {
    /// Create an enabled connection without parameters.
    #[must_use]
    pub fn new(
        connection_type: ConnectionType,
        mark_from: u64,
        mark_to: u64,
        historical_mark: u64,
    ) -> Self {
        Self {
            connection_type,
            mark_from,
            mark_to,
            historical_mark,
            enabled: true,
            params: Params::new(),
        }
    }

    /// Create an enabled forward connection carrying a `weight` parameter.
    #[must_use]
    pub fn weighted(mark_from: u64, mark_to: u64, historical_mark: u64, weight: f64) -> Self {
        let mut gene = Self::new(ConnectionType::Forward, mark_from, mark_to, historical_mark);
        gene.params.set("weight", weight);
        gene
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn connects(&self, mark_from: u64, mark_to: u64) -> bool {
        self.mark_from == mark_from && self.mark_to == mark_to
    }

    #[must_use]
    pub fn touches(&self, neuron_mark: u64) -> bool {
        self.mark_from == neuron_mark || self.mark_to == neuron_mark
    }
}

impl Gene for ConnectionGene {
    fn historical_mark(&self) -> u64 {
        self.historical_mark
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn type_name(&self) -> &'static str {
        self.connection_type.as_str()
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NEAT connection gene, mark: {}, type: {}, from: {}, to: {}",
            self.historical_mark,
            self.connection_type.as_str(),
            self.mark_from,
            self.mark_to
        )
    }
}

/// A borrowed view of either gene variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneRef<'a> {
    Neuron(&'a NeuronGene),
    Connection(&'a ConnectionGene),
}

impl GeneRef<'_> {
    #[must_use]
    pub fn historical_mark(&self) -> u64 {
        match self {
            GeneRef::Neuron(n) => n.historical_mark(),
            GeneRef::Connection(c) => c.historical_mark(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            GeneRef::Neuron(n) => n.enabled,
            GeneRef::Connection(c) => c.enabled,
        }
    }

    #[must_use]
    pub fn as_gene(&self) -> &dyn Gene {
        match self {
            GeneRef::Neuron(n) => *n as &dyn Gene,
            GeneRef::Connection(c) => *c as &dyn Gene,
        }
    }
}
