//! BeatStrip Light - Lighting Compositor
//!
//! The lighting half of BeatStrip:
//! - **LightSegment**: one movable, dimmable, gradient region of the strip
//! - **LightEffect**: a set of segments composited with
//!   transparency-weighted overlap
//! - **LightScene**: a set of effects with palette ownership and a
//!   transition state machine
//! - **CommandRouter**: regex address routing for incoming commands
//! - **LightController**: applies commands to scenes and emits packed
//!   binary LED frames
//! - **Scene documents**: JSON persistence of scenes/effects/segments

#![allow(missing_docs)]

pub mod controller;
pub mod effect;
pub mod error;
pub mod router;
pub mod scene;
pub mod scene_io;
pub mod segment;

pub use controller::LightController;
pub use effect::LightEffect;
pub use error::{LightError, Result};
pub use router::{CommandRouter, Route};
pub use scene::LightScene;
pub use scene_io::{EffectDoc, SceneDoc, SegmentDoc};
pub use segment::LightSegment;
