pub mod terrain_bridge;

pub use terrain_bridge::{
    NullSceneHost, RecordingSceneHost, RenderHandle, Renderable, RenderableKind, SceneHost, Transform,
};
