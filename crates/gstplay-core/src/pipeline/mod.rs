//! Pipeline descriptions
//!
//! The framework takes a textual launch description. It is assembled here
//! from typed pieces and only turned into text at the boundary:
//!
//! ```text
//! filesrc location=/m/a.avi ! avidemux name=demuxer  demuxer.video_0 ! queue ! avdec_mpeg4 ! xvimagesink
//! └──────────── main chain ───────────────────────┘  └──────────────── video chain ──────────────────┘
//! ```
//!
//! Property values are inserted as given. Locators and sink names must not
//! contain launch syntax; that is a constraint of the description grammar.

mod synth;

pub use synth::{playbin_flags, synthesize, SynthesisOptions};

use std::fmt;

/// One element with its properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    factory: String,
    name: Option<String>,
    properties: Vec<(String, String)>,
}

impl Element {
    pub fn new(factory: impl Into<String>) -> Self {
        Self {
            factory: factory.into(),
            name: None,
            properties: Vec::new(),
        }
    }

    /// Element text supplied by the user (a sink name, possibly with
    /// properties), emitted unchanged
    pub fn verbatim(text: impl Into<String>) -> Self {
        Self::new(text.into().trim().to_string())
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.properties.push((key.into(), value.to_string()));
        self
    }

    pub fn factory(&self) -> &str {
        &self.factory
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Look up a property value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.factory)?;
        if let Some(name) = &self.name {
            write!(f, " name={name}")?;
        }
        for (key, value) in &self.properties {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Reference to a pad of a named element (`demuxer.` or `demuxer.video_0`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadRef {
    pub element: String,
    pub pad: Option<String>,
}

impl PadRef {
    pub fn any(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            pad: None,
        }
    }

    pub fn pad(element: impl Into<String>, pad: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            pad: Some(pad.into()),
        }
    }
}

impl fmt::Display for PadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pad {
            Some(pad) => write!(f, "{}.{}", self.element, pad),
            None => write!(f, "{}.", self.element),
        }
    }
}

/// Linear run of linked elements, optionally fed from a named pad
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    from: Option<PadRef>,
    elements: Vec<Element>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pad(pad: PadRef) -> Self {
        Self {
            from: Some(pad),
            elements: Vec::new(),
        }
    }

    pub fn then(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn then_if(self, condition: bool, element: Element) -> Self {
        if condition {
            self.then(element)
        } else {
            self
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(from) = &self.from {
            write!(f, "{from}")?;
            first = false;
        }
        for element in &self.elements {
            if !first {
                f.write_str(" ! ")?;
            }
            write!(f, "{element}")?;
            first = false;
        }
        Ok(())
    }
}

/// What a branch feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchRole {
    /// Source and demuxer, or the single `playbin`
    Main,
    Video,
    Audio,
}

/// A chain in a fixed slot of the description. A disabled branch keeps its
/// slot and renders as an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub role: BranchRole,
    pub chain: Option<Chain>,
}

impl Branch {
    pub fn enabled(role: BranchRole, chain: Chain) -> Self {
        Self {
            role,
            chain: Some(chain),
        }
    }

    pub fn disabled(role: BranchRole) -> Self {
        Self { role, chain: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.chain.is_some()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.chain {
            Some(chain) => write!(f, "{chain}"),
            None => Ok(()),
        }
    }
}

/// Complete launch description, consumed once by the framework
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDescription {
    branches: Vec<Branch>,
    playbin: bool,
}

impl PipelineDescription {
    /// Separator between independent chains
    pub const CHAIN_SEPARATOR: &'static str = "  ";

    /// Description made of a single self-contained `playbin`
    pub fn playbin(element: Element) -> Self {
        Self {
            branches: vec![Branch::enabled(BranchRole::Main, Chain::new().then(element))],
            playbin: true,
        }
    }

    /// Description made of explicit chains
    pub fn chains(branches: Vec<Branch>) -> Self {
        Self {
            branches,
            playbin: false,
        }
    }

    /// True when the whole description is one `playbin` element
    pub fn is_playbin(&self) -> bool {
        self.playbin
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch(&self, role: BranchRole) -> Option<&Branch> {
        self.branches.iter().find(|b| b.role == role)
    }

    /// Rendered text of the branch in `role`; disabled branches give `""`
    pub fn branch_text(&self, role: BranchRole) -> Option<String> {
        self.branch(role).map(|b| b.to_string())
    }

    /// Iterate over every element in the description
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.branches
            .iter()
            .filter_map(|b| b.chain.as_ref())
            .flat_map(|c| c.elements().iter())
    }
}

impl fmt::Display for PipelineDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for branch in self.branches.iter().filter(|b| b.is_enabled()) {
            if !first {
                f.write_str(Self::CHAIN_SEPARATOR)?;
            }
            write!(f, "{branch}")?;
            first = false;
        }
        Ok(())
    }
}
