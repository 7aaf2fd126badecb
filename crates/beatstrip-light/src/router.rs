//! Address routing for incoming lighting commands.
//!
//! Patterns live in a fixed ordered list compiled once at construction;
//! the first match wins.

use regex::Regex;

/// A successfully routed command address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SceneLoadEffects {
        scene_id: i32,
    },
    SceneChangeEffect {
        scene_id: i32,
    },
    SceneChangePalette {
        scene_id: i32,
    },
    SceneEffectSegment {
        scene_id: i32,
        effect_id: i32,
        segment_id: i32,
        param: String,
    },
}

#[derive(Debug, Clone, Copy)]
enum PatternKind {
    LoadEffects,
    ChangeEffect,
    ChangePalette,
    EffectSegment,
}

/// Ordered first-match-wins command address router.
#[derive(Debug)]
pub struct CommandRouter {
    patterns: Vec<(Regex, PatternKind)>,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRouter {
    pub fn new() -> Self {
        let table = [
            (r"^/scene/(\d+)/load_effects$", PatternKind::LoadEffects),
            (r"^/scene/(\d+)/change_effect$", PatternKind::ChangeEffect),
            (r"^/scene/(\d+)/change_palette$", PatternKind::ChangePalette),
            (
                r"^/scene/(\d+)/effect/(\d+)/segment/(\d+)/(.+)$",
                PatternKind::EffectSegment,
            ),
        ];
        let patterns = table
            .into_iter()
            .map(|(pattern, kind)| {
                (
                    Regex::new(pattern).expect("hard-coded pattern compiles"),
                    kind,
                )
            })
            .collect();
        Self { patterns }
    }

    /// Match `address` against the pattern list.
    pub fn route(&self, address: &str) -> Option<Route> {
        for (pattern, kind) in &self.patterns {
            if let Some(captures) = pattern.captures(address) {
                return Self::build_route(*kind, &captures);
            }
        }
        None
    }

    fn build_route(kind: PatternKind, captures: &regex::Captures<'_>) -> Option<Route> {
        let id = |index: usize| captures.get(index)?.as_str().parse::<i32>().ok();
        match kind {
            PatternKind::LoadEffects => Some(Route::SceneLoadEffects { scene_id: id(1)? }),
            PatternKind::ChangeEffect => Some(Route::SceneChangeEffect { scene_id: id(1)? }),
            PatternKind::ChangePalette => Some(Route::SceneChangePalette { scene_id: id(1)? }),
            PatternKind::EffectSegment => Some(Route::SceneEffectSegment {
                scene_id: id(1)?,
                effect_id: id(2)?,
                segment_id: id(3)?,
                param: captures.get(4)?.as_str().to_string(),
            }),
        }
    }
}
