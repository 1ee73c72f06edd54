//! Locator strategies understood by the UI tree

use driver::Locator;
use std::str::FromStr;

use crate::error::UiTreeError;
use crate::types::UiNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Id,
    Name,
    ClassName,
    Text,
    PartialText,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::ClassName => "class name",
            Strategy::Text => "text",
            Strategy::PartialText => "partial text",
        }
    }

    pub fn matches(&self, node: &UiNode, value: &str) -> bool {
        match self {
            Strategy::Id => node.id.as_deref() == Some(value),
            Strategy::Name => node.name.as_deref() == Some(value),
            Strategy::ClassName => node.kind == value,
            Strategy::Text => node.text.as_deref() == Some(value),
            Strategy::PartialText => node.text.as_deref().is_some_and(|t| t.contains(value)),
        }
    }
}

impl FromStr for Strategy {
    type Err = UiTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Strategy::Id),
            "name" => Ok(Strategy::Name),
            "class name" => Ok(Strategy::ClassName),
            "text" => Ok(Strategy::Text),
            "partial text" => Ok(Strategy::PartialText),
            other => Err(UiTreeError::UnsupportedStrategy(other.to_string())),
        }
    }
}

/// Does `node` satisfy `locator`?
pub fn matches(node: &UiNode, locator: &Locator) -> crate::error::Result<bool> {
    let strategy: Strategy = locator.using.parse()?;
    Ok(strategy.matches(node, &locator.value))
}
