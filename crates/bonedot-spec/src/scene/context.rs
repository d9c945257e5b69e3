//! Sprite-object lookup.

use std::collections::HashSet;

use super::SceneDocument;

/// Remembers the most recently resolved sprite object between calls.
///
/// Callers own the context and pass it to every lookup, so two independent
/// editing sessions never share a fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteContext {
    last_sprite_object: Option<String>,
}

impl SpriteContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sprite object remembered from the last successful lookup.
    pub fn last_sprite_object(&self) -> Option<&str> {
        self.last_sprite_object.as_deref()
    }

    /// Finds the sprite object owning `start`.
    ///
    /// Walks from `start` up through its parents and returns the first object
    /// flagged as a sprite object, remembering it. When the walk finds none
    /// (or `start` is `None`), returns the remembered object if it still
    /// exists in `scene`. Parent cycles end the walk.
    pub fn resolve(&mut self, scene: &SceneDocument, start: Option<&str>) -> Option<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = start.and_then(|name| scene.object(name));

        while let Some(obj) = current {
            if !visited.insert(obj.name.as_str()) {
                tracing::warn!(object = %obj.name, "parent cycle while resolving sprite object");
                break;
            }
            if obj.sprite_object {
                self.last_sprite_object = Some(obj.name.clone());
                return Some(obj.name.clone());
            }
            current = obj.parent.as_deref().and_then(|p| scene.object(p));
        }

        self.last_sprite_object
            .as_deref()
            .filter(|name| scene.object(name).is_some())
            .map(str::to_string)
    }
}
