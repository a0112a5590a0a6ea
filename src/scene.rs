//! Scene content the simulation drives
//!
//! Transforms live in an arena owned by `SceneGraph`; gameplay code only holds
//! `TransformId` handles and writes the position/rotation/scale fields it manages.
//! Drawing is delegated to a `SceneRenderer` supplied by the host.

use std::ops::{Index, IndexMut};

use glam::{Mat4, Quat, Vec2, Vec3};

/// Handle to a transform inside a `SceneGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId(u32);

impl TransformId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named node pose
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local-to-parent matrix (scene nodes here have no parents, so this is world space)
    pub fn make_local_to_parent(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// A perspective camera attached to a transform
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub transform: TransformId,
    /// Vertical field of view (radians)
    pub fovy: f32,
    /// Width / height, refreshed every draw
    pub aspect: f32,
}

/// A scene light attached to a transform
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub transform: TransformId,
    pub energy: Vec3,
}

/// Spot light parameters handed to the renderer each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    /// Cosine of the cone half-angle
    pub cutoff_cos: f32,
    pub energy: Vec3,
}

/// Drawing entry points provided by the rendering subsystem
pub trait SceneRenderer {
    /// Draw every drawable in the scene from the given camera
    fn draw_scene(&mut self, scene: &SceneGraph, camera: &Camera, light: &SpotLight);

    /// Overlay a line of text; `anchor` is in aspect-corrected clip space
    fn draw_text(&mut self, text: &str, anchor: Vec2, height: f32, color: [u8; 4]);
}

/// Arena of transforms plus cameras and lights
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    transforms: Vec<Transform>,
    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transform, returning its handle
    pub fn add(&mut self, transform: Transform) -> TransformId {
        let id = TransformId(self.transforms.len() as u32);
        self.transforms.push(transform);
        id
    }

    /// Add a camera with its own transform
    pub fn add_camera(&mut self, transform: Transform, fovy: f32) -> TransformId {
        let id = self.add(transform);
        self.cameras.push(Camera {
            transform: id,
            fovy,
            aspect: 1.0,
        });
        id
    }

    /// Add a light with its own transform
    pub fn add_light(&mut self, transform: Transform, energy: Vec3) -> TransformId {
        let id = self.add(transform);
        self.lights.push(Light {
            transform: id,
            energy,
        });
        id
    }

    /// First transform with exactly this name
    pub fn find(&self, name: &str) -> Option<TransformId> {
        self.iter().find(|(_, t)| t.name == name).map(|(id, _)| id)
    }

    /// All transforms whose name contains `pattern`, in arena order
    pub fn find_all_containing(&self, pattern: &str) -> Vec<TransformId> {
        self.iter()
            .filter(|(_, t)| t.name.contains(pattern))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransformId, &Transform)> {
        self.transforms
            .iter()
            .enumerate()
            .map(|(i, t)| (TransformId(i as u32), t))
    }
}

impl Index<TransformId> for SceneGraph {
    type Output = Transform;

    fn index(&self, id: TransformId) -> &Transform {
        &self.transforms[id.index()]
    }
}

impl IndexMut<TransformId> for SceneGraph {
    fn index_mut(&mut self, id: TransformId) -> &mut Transform {
        &mut self.transforms[id.index()]
    }
}

/// Renderer that records what it was asked to draw (headless runs and tests)
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: u32,
    pub last_aspect: f32,
    pub last_light: Option<SpotLight>,
    pub texts: Vec<(String, [u8; 4])>,
}

impl SceneRenderer for RecordingRenderer {
    fn draw_scene(&mut self, _scene: &SceneGraph, camera: &Camera, light: &SpotLight) {
        self.frames += 1;
        self.last_aspect = camera.aspect;
        self.last_light = Some(*light);
        self.texts.clear();
    }

    fn draw_text(&mut self, text: &str, _anchor: Vec2, _height: f32, color: [u8; 4]) {
        self.texts.push((text.to_string(), color));
    }
}
