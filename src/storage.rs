use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::GraphConfig;
use crate::models::ItemRef;
use crate::render::RenderedGraph;
use crate::source::{ItemHistory, MemorySource};

/// A graph description bundled with the raw history it draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub graph: GraphConfig,
    #[serde(default)]
    pub items: BTreeMap<ItemRef, ItemHistory>,
}

impl Scene {
    pub fn into_parts(self) -> (GraphConfig, MemorySource) {
        let mut source = MemorySource::new();
        for (item, history) in self.items {
            source.insert(item, history);
        }
        (self.graph, source)
    }
}

/// Read a JSON scene file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening scene {}", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing scene {}", path.display()))
}

/// Save a scene as pretty JSON.
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(scene)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save the rendered primitive stream, with the computed axes and grid, as pretty JSON.
pub fn save_rendered_json<P: AsRef<Path>>(graph: &RenderedGraph, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(graph)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    #[test]
    fn scene_round_trips_through_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let mut scene = Scene::default();
        scene.items.insert(
            ItemRef::new("cpu"),
            ItemHistory {
                samples: vec![(100, Decimal::new(15, 1))],
                thresholds: Vec::new(),
            },
        );
        save_scene(&scene, &path).unwrap();
        let loaded = load_scene(&path).unwrap();
        assert_eq!(loaded, scene);
    }

    #[test]
    fn missing_scene_names_the_path() {
        let err = load_scene("/definitely/not/here.json").unwrap_err();
        assert!(format!("{err:#}").contains("not/here.json"));
    }
}
