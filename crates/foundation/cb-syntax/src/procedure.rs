//! Procedure division headers, procedure declarations and statements

use crate::data::{DataDescriptionEntry, SymbolReference};
use cb_span::Position;
use serde::{Deserialize, Serialize};

/// How a `USING` argument is shared with the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SharingMode {
    /// `BY REFERENCE`, the default
    #[default]
    ByReference,
    /// `BY CONTENT`
    ByContent,
    /// `BY VALUE`
    ByValue,
}

/// Direction of a procedure parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassingDirection {
    /// `INPUT`
    Input,
    /// `OUTPUT`
    Output,
    /// `IN-OUT`
    InOut,
}

/// One `USING` parameter of a PROCEDURE DIVISION header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallParameter {
    /// LINKAGE SECTION item
    pub target: SymbolReference,
    /// Explicit sharing mode, `BY REFERENCE` when absent
    pub sharing: Option<SharingMode>,
    /// Explicit direction
    pub direction: Option<PassingDirection>,
}

impl CallParameter {
    /// A `BY REFERENCE` parameter without direction
    #[must_use]
    pub fn by_reference(target: SymbolReference) -> Self {
        Self {
            target,
            sharing: None,
            direction: None,
        }
    }
}

/// `PROCEDURE DIVISION [USING ...] [RETURNING ...]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcedureDivisionHeader {
    /// Position of the header
    pub position: Position,
    /// `USING` parameters in declaration order
    #[serde(default)]
    pub using: Vec<CallParameter>,
    /// `RETURNING` item
    pub returning: Option<SymbolReference>,
}

/// Visibility of a declared procedure or type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccessModifier {
    /// Visible inside the declaring program only
    #[default]
    Private,
    /// Visible to other programs
    Public,
}

/// Whether a declaration returns a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FunctionKind {
    /// `DECLARE FUNCTION` with a `RETURNING` parameter
    Function,
    /// `DECLARE PROCEDURE`
    #[default]
    Procedure,
}

/// `DECLARE FUNCTION|PROCEDURE ... END-DECLARE` header
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDeclarationHeader {
    /// Declared name
    pub name: String,
    /// Position of the name
    pub position: Position,
    /// Declared visibility
    pub visibility: AccessModifier,
    /// Function or procedure
    pub kind: FunctionKind,
    /// `INPUT` parameters
    pub input: Vec<DataDescriptionEntry>,
    /// `OUTPUT` parameters
    pub output: Vec<DataDescriptionEntry>,
    /// `IN-OUT` parameters
    pub inout: Vec<DataDescriptionEntry>,
    /// `RETURNING` parameter
    pub returning: Option<DataDescriptionEntry>,
}

impl FunctionDeclarationHeader {
    /// A private procedure with no parameters
    #[must_use]
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            ..Self::default()
        }
    }

    /// Every parameter with its direction; `None` marks the `RETURNING` one
    pub fn parameters(
        &self,
    ) -> impl Iterator<Item = (Option<PassingDirection>, &DataDescriptionEntry)> {
        let input = self.input.iter().map(|entry| (Some(PassingDirection::Input), entry));
        let output = self.output.iter().map(|entry| (Some(PassingDirection::Output), entry));
        let inout = self.inout.iter().map(|entry| (Some(PassingDirection::InOut), entry));
        let returning = self.returning.iter().map(|entry| (None, entry));
        input.chain(output).chain(inout).chain(returning)
    }
}

/// Header of a procedure division section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureSectionHeader {
    /// Section name
    pub name: String,
    /// Position of the name
    pub position: Position,
}

/// Header of a paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphHeader {
    /// Paragraph name
    pub name: String,
    /// Position of the name
    pub position: Position,
}

/// Statement kinds the tree records as leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// `MOVE`
    Move,
    /// `PERFORM`
    Perform,
    /// `CALL`
    Call,
    /// `DISPLAY`
    Display,
    /// `COMPUTE`
    Compute,
    /// `IF`
    If,
    /// `EVALUATE`
    Evaluate,
    /// `GOBACK`
    Goback,
    /// `STOP RUN`
    Stop,
    /// `CONTINUE`
    Continue,
    /// `SET`
    Set,
    /// `ADD`
    Add,
    /// `SUBTRACT`
    Subtract,
    /// `INITIALIZE`
    Initialize,
    /// `EXIT`
    Exit,
    /// Any other statement
    Other,
}

/// An executable statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement kind
    pub kind: StatementKind,
    /// Position of the verb
    pub position: Position,
}
