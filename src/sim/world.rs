//! Lane scrolling
//!
//! Tiles and obstacles travel toward +Y. Anything that passes the camera is recycled
//! to the back of the lane instead of being destroyed.

use std::collections::VecDeque;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::FORWARD;
use crate::audio::{AudioBackend, AudioManager, SoundCue, SoundHandle};
use crate::scene::{SceneGraph, Transform, TransformId};
use crate::tuning::Tuning;

/// An obstacle box and its horn cue
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub transform: TransformId,
    pub sound: Option<SoundHandle>,
}

/// Pose captured at construction, restored on reset
#[derive(Debug, Clone, PartialEq)]
struct Placement {
    id: TransformId,
    position: Vec3,
    scale: Vec3,
}

impl Placement {
    fn capture(scene: &SceneGraph, id: TransformId) -> Self {
        let t = &scene[id];
        Self {
            id,
            position: t.position,
            scale: t.scale,
        }
    }

    fn restore(&self, scene: &mut SceneGraph) {
        let t = &mut scene[self.id];
        t.position = self.position;
        t.scale = self.scale;
    }
}

/// What one scroll step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollReport {
    pub tiles_recycled: u32,
    pub obstacle_recycled: bool,
    pub cues_started: u32,
}

/// Tile lane plus obstacle ring
pub struct World {
    /// Sorted descending by Y (front first)
    pub tiles: Vec<TransformId>,
    /// Front of the ring is the next obstacle to recycle
    pub obstacles: VecDeque<Obstacle>,
    rng: Pcg32,
    initial_tiles: Vec<Placement>,
    initial_obstacles: Vec<Placement>,
}

fn sort_descending(scene: &SceneGraph, ids: &mut [TransformId]) {
    ids.sort_by(|a, b| scene[*b].position.y.total_cmp(&scene[*a].position.y));
}

impl World {
    /// Build from the scene's tile and obstacle transforms; both lists are sorted front first
    pub fn new(
        scene: &SceneGraph,
        mut tiles: Vec<TransformId>,
        mut obstacles: Vec<TransformId>,
        seed: u64,
    ) -> Self {
        sort_descending(scene, &mut tiles);
        sort_descending(scene, &mut obstacles);

        let initial_tiles = tiles.iter().map(|&id| Placement::capture(scene, id)).collect();
        let initial_obstacles = obstacles
            .iter()
            .map(|&id| Placement::capture(scene, id))
            .collect();

        Self {
            tiles,
            obstacles: obstacles
                .into_iter()
                .map(|transform| Obstacle {
                    transform,
                    sound: None,
                })
                .collect(),
            rng: Pcg32::seed_from_u64(seed),
            initial_tiles,
            initial_obstacles,
        }
    }

    /// Rearmost tile (lowest Y)
    pub fn rear_tile(&self) -> Option<TransformId> {
        self.tiles.last().copied()
    }

    /// Obstacle transforms, front first
    pub fn obstacle_transforms<'a>(
        &'a self,
        scene: &'a SceneGraph,
    ) -> impl Iterator<Item = &'a Transform> + 'a {
        self.obstacles.iter().map(move |o| &scene[o.transform])
    }

    /// Move every tile by `speed * dt`, recycling the ones that pass `camera_y`
    pub fn scroll_tiles(
        &mut self,
        scene: &mut SceneGraph,
        speed: f32,
        camera_y: f32,
        tile_gap: f32,
        dt: f32,
    ) -> u32 {
        for &id in &self.tiles {
            scene[id].position.y += speed * dt;
        }

        // Each tile can be recycled at most once per step
        let mut recycled = 0;
        while (recycled as usize) < self.tiles.len() {
            let front = self.tiles[0];
            if scene[front].position.y <= camera_y {
                break;
            }
            let Some(rear) = self.rear_tile() else { break };
            let rear_y = scene[rear].position.y;
            scene[front].position.y = rear_y - tile_gap;
            sort_descending(scene, &mut self.tiles);
            recycled += 1;
        }
        if recycled > 0 {
            log::debug!("Recycled {recycled} tile(s)");
        }
        recycled
    }

    /// Recycle the front obstacle once the lookahead obstacle reaches the camera
    pub fn recycle_obstacle<B: AudioBackend>(
        &mut self,
        scene: &mut SceneGraph,
        audio: &mut AudioManager<B>,
        tuning: &Tuning,
        camera_y: f32,
    ) -> bool {
        if self.obstacles.is_empty() {
            return false;
        }
        let lookahead = tuning.obstacle_lookahead.min(self.obstacles.len().saturating_sub(1));
        // Obstacles stop advancing at the camera, so reaching it counts as passing it
        if scene[self.obstacles[lookahead].transform].position.y < camera_y {
            return false;
        }
        let Some(rear) = self.rear_tile() else {
            return false;
        };
        let rear_position = scene[rear].position;
        let Some(mut obstacle) = self.obstacles.pop_front() else {
            return false;
        };

        if let Some(handle) = obstacle.sound.take() {
            audio.stop(handle);
        }

        let steps = self.rng.random_range(1..=tuning.obstacle_spacing_steps.max(1));
        let offset = steps as f32 * tuning.obstacle_spacing;
        let t = &mut scene[obstacle.transform];
        t.scale = tuning.obstacle_scale;
        t.position = rear_position - FORWARD * offset;
        log::debug!("Recycled {} to y={:.1}", t.name, t.position.y);

        self.obstacles.push_back(obstacle);
        true
    }

    /// Move obstacles still ahead of the camera and keep their cues attached
    pub fn advance_obstacles<B: AudioBackend>(
        &mut self,
        scene: &mut SceneGraph,
        audio: &mut AudioManager<B>,
        tuning: &Tuning,
        camera_y: f32,
        dt: f32,
    ) -> u32 {
        let speed = tuning.obstacle_speed_factor * tuning.base_speed;
        let mut started = 0;

        for obstacle in &mut self.obstacles {
            let t = &mut scene[obstacle.transform];
            if t.position.y >= camera_y {
                continue;
            }
            t.position.y += speed * dt;
            if t.position.y <= tuning.sound_threshold_y {
                continue;
            }

            let position = t.position;
            match obstacle.sound.filter(|&h| !audio.is_stopped(h)) {
                Some(handle) => audio.set_position(handle, position),
                None => {
                    obstacle.sound = Some(audio.play_at(
                        SoundCue::Honk,
                        tuning.sound_volume,
                        position,
                        tuning.sound_max_distance,
                    ));
                    started += 1;
                }
            }
        }
        started
    }

    /// One full scroll step: tiles, obstacle recycling, obstacle motion and cues
    pub fn scroll<B: AudioBackend>(
        &mut self,
        scene: &mut SceneGraph,
        audio: &mut AudioManager<B>,
        tuning: &Tuning,
        forward_speed: f32,
        camera_y: f32,
        dt: f32,
    ) -> ScrollReport {
        let tiles_recycled = self.scroll_tiles(
            scene,
            forward_speed + tuning.base_speed,
            camera_y,
            tuning.tile_gap,
            dt,
        );
        let obstacle_recycled = self.recycle_obstacle(scene, audio, tuning, camera_y);
        let cues_started = self.advance_obstacles(scene, audio, tuning, camera_y, dt);
        ScrollReport {
            tiles_recycled,
            obstacle_recycled,
            cues_started,
        }
    }

    /// Restore the construction-time layout and silence every cue
    pub fn reset<B: AudioBackend>(&mut self, scene: &mut SceneGraph, audio: &mut AudioManager<B>) {
        for obstacle in &mut self.obstacles {
            if let Some(handle) = obstacle.sound.take() {
                audio.stop(handle);
            }
        }
        for placement in self.initial_tiles.iter().chain(&self.initial_obstacles) {
            placement.restore(scene);
        }
        self.tiles = self.initial_tiles.iter().map(|p| p.id).collect();
        self.obstacles = self
            .initial_obstacles
            .iter()
            .map(|p| Obstacle {
                transform: p.id,
                sound: None,
            })
            .collect();
    }
}
