//! Load MDPs from JSON files

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use markov_core::{Mdp, MdpDefinition};

use crate::GridWorld;

/// Read an [`MdpDefinition`] from a JSON file
pub fn load_definition(path: impl AsRef<Path>) -> Result<MdpDefinition> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read MDP definition {}", path.display()))?;

    let definition = MdpDefinition::from_json_str(&content)
        .with_context(|| format!("Failed to parse MDP definition {}", path.display()))?;

    Ok(definition)
}

/// Read a definition file and construct the MDP it describes
pub fn load_mdp(path: impl AsRef<Path>) -> Result<Mdp> {
    let path = path.as_ref();
    let definition = load_definition(path)?;
    let mdp = Mdp::from_definition(&definition)
        .with_context(|| format!("Invalid MDP definition {}", path.display()))?;

    info!(
        path = %path.display(),
        states = mdp.len(),
        actions = mdp.actions().count(),
        "loaded MDP"
    );
    Ok(mdp)
}

/// Read a [`GridWorld`] description from a JSON file and build it
pub fn load_gridworld(path: impl AsRef<Path>) -> Result<Mdp> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read grid world {}", path.display()))?;
    let world: GridWorld = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse grid world {}", path.display()))?;

    world
        .build()
        .with_context(|| format!("Invalid grid world {}", path.display()))
}
