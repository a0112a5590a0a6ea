//! Game session controller
//!
//! Owns the per-frame sequence: input -> jump -> collision -> scrolling -> audio.
//! A crash freezes the session until jump is pressed again, which resets it in place.

use glam::{UVec2, Vec2, Vec3};

use super::car::{Car, JumpPhase, JumpTransition};
use super::collision::check_collision;
use super::input::{Buttons, InputEvent, Key};
use super::world::World;
use crate::audio::{AudioBackend, AudioManager};
use crate::consts::LISTENER_DT;
use crate::error::SetupError;
use crate::scene::{SceneGraph, SceneRenderer, SpotLight, Transform};
use crate::settings::Settings;
use crate::tuning::Tuning;

pub const INSTRUCTION_TEXT: &str = "Press SPACE bar to make the car FLYYYY";
pub const RESTART_TEXT: &str = "Press SPACE again to restart";
pub const GAME_OVER_TEXT: &str = "GAME OVER";

const WHITE: [u8; 4] = [0xff, 0xff, 0xff, 0x00];
const SHADOW: [u8; 4] = [0x00, 0x00, 0x00, 0x00];
const CRASH_RED: [u8; 4] = [0xff, 0x40, 0x40, 0x00];

/// Text overlay state
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub game_over: bool,
    pub instruction_text: String,
    pub status_text: String,
    pub status_color: [u8; 4],
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            game_over: false,
            instruction_text: INSTRUCTION_TEXT.to_string(),
            status_text: String::new(),
            status_color: WHITE,
        }
    }
}

/// Notable things that happened during `handle_event`/`update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    JumpReleased,
    Landed,
    Crashed,
    Restarted,
    TilesRecycled(u32),
    ObstacleRecycled,
    /// Escape was pressed; the host should release pointer capture
    PointerReleased,
}

/// One running game
pub struct GameSession<B> {
    scene: SceneGraph,
    audio: AudioManager<B>,
    tuning: Tuning,
    show_hud: bool,
    buttons: Buttons,
    car: Car,
    world: World,
    hud: Hud,
    events: Vec<GameEvent>,
}

impl<B: AudioBackend> GameSession<B> {
    /// Bind to the scene's car, tiles, obstacles, camera and light
    pub fn new(
        mut scene: SceneGraph,
        audio: B,
        tuning: Tuning,
        settings: &Settings,
    ) -> Result<Self, SetupError> {
        let car_id = scene.find("Car").ok_or(SetupError::MissingCar)?;

        let tiles = scene.find_all_containing("Cube");
        if tiles.len() != tuning.tile_count {
            return Err(SetupError::TileCount {
                found: tiles.len(),
                expected: tuning.tile_count,
            });
        }

        if scene.cameras.len() != 1 {
            return Err(SetupError::CameraCount {
                found: scene.cameras.len(),
            });
        }
        if scene.lights.is_empty() {
            return Err(SetupError::MissingLight);
        }

        let obstacles = scene.find_all_containing("Box");
        if obstacles.is_empty() {
            return Err(SetupError::NoObstacles);
        }
        log::info!(
            "Scene bound: {} tiles, {} obstacles, camera fov {:.2}",
            tiles.len(),
            obstacles.len(),
            scene.cameras[0].fovy
        );

        let world = World::new(&scene, tiles, obstacles, settings.seed);
        let mut car = Car::new(car_id, &tuning);
        car.reset(&tuning, &mut scene[car_id]);

        Ok(Self {
            scene,
            audio: AudioManager::with_settings(audio, settings),
            tuning,
            show_hud: settings.show_hud,
            buttons: Buttons::default(),
            car,
            world,
            hud: Hud::default(),
            events: Vec::new(),
        })
    }

    /// Feed one host event; returns true if it was consumed
    pub fn handle_event(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::KeyDown(Key::Escape) => {
                self.events.push(GameEvent::PointerReleased);
                true
            }
            InputEvent::KeyDown(key) => self.buttons.on_key_down(key, self.car.is_grounded()),
            InputEvent::KeyUp(key) => self.buttons.on_key_up(key),
            InputEvent::Other => false,
        }
    }

    /// Advance one frame
    pub fn update(&mut self, elapsed: f32) {
        if self.hud.game_over {
            if self.buttons.jump.pressed {
                self.reset();
            }
            return;
        }

        self.update_car(elapsed);

        let crashed = check_collision(
            &self.scene[self.car.transform],
            &self.car.hull.current,
            self.world.obstacle_transforms(&self.scene),
            self.tuning.broad_phase_radius,
        );
        if crashed {
            self.crash();
        }

        let camera_y = self.camera_transform().position.y;
        let report = self.world.scroll(
            &mut self.scene,
            &mut self.audio,
            &self.tuning,
            self.car.forward_speed,
            camera_y,
            elapsed,
        );
        if report.tiles_recycled > 0 {
            self.events.push(GameEvent::TilesRecycled(report.tiles_recycled));
        }
        if report.obstacle_recycled {
            self.events.push(GameEvent::ObstacleRecycled);
        }

        let frame = self.camera_transform().make_local_to_parent();
        let right = frame.x_axis.truncate();
        let at = frame.w_axis.truncate();
        self.audio.set_listener(at, right, LISTENER_DT);
        self.audio.update(elapsed);
    }

    fn update_car(&mut self, elapsed: f32) {
        let steering = self.buttons.steering();
        let pose = &mut self.scene[self.car.transform];
        let transition = self
            .car
            .step(&mut self.buttons.jump, steering, &self.tuning, pose, elapsed);

        match transition {
            Some(JumpTransition::TookOff) => {
                log::info!("Jump! spin axis {:?}", self.car.rotation_axis);
                self.events.push(GameEvent::Jumped);
            }
            Some(JumpTransition::Released) => {
                log::debug!("Jump released after {:.2}s", self.car.air_time);
                self.events.push(GameEvent::JumpReleased);
            }
            Some(JumpTransition::Landed) => {
                log::info!("Landed");
                self.events.push(GameEvent::Landed);
            }
            None => {}
        }
    }

    fn crash(&mut self) {
        log::info!("GAME OVER");
        self.hud.game_over = true;
        self.hud.status_text = GAME_OVER_TEXT.to_string();
        self.hud.instruction_text = RESTART_TEXT.to_string();
        self.hud.status_color = CRASH_RED;
        self.buttons.jump.pressed = false;
        self.car.force_grounded();
        self.events.push(GameEvent::Crashed);
    }

    /// Start over: car, lane and obstacles return to their initial layout
    pub fn reset(&mut self) {
        let pose = &mut self.scene[self.car.transform];
        self.car.reset(&self.tuning, pose);
        self.world.reset(&mut self.scene, &mut self.audio);
        self.buttons = Buttons::default();
        self.hud = Hud::default();
        self.events.push(GameEvent::Restarted);
        log::info!("Restarted");
    }

    /// Render the scene and the text overlay
    pub fn draw(&mut self, drawable_size: UVec2, renderer: &mut impl SceneRenderer) {
        let height = drawable_size.y.max(1) as f32;
        let aspect = drawable_size.x as f32 / height;
        self.scene.cameras[0].aspect = aspect;

        let car_position = self.scene[self.car.transform].position;
        let light = SpotLight {
            position: car_position + Vec3::new(0.0, 1.4, 6.0),
            direction: Vec3::new(0.0, -0.3, -0.7),
            cutoff_cos: (std::f32::consts::PI * 0.3).cos(),
            energy: 50.0 * Vec3::new(1.0, 1.0, 0.9),
        };
        renderer.draw_scene(&self.scene, &self.scene.cameras[0], &light);

        if !self.show_hud {
            return;
        }

        // Text height in clip units; shadow drawn first, one pixel offset
        const H: f32 = 0.09;
        let ofs = 2.0 / height;

        let at = Vec2::new(-aspect + 0.1 * H, -1.0 + 0.1 * H);
        renderer.draw_text(&self.hud.instruction_text, at, H, SHADOW);
        renderer.draw_text(&self.hud.instruction_text, at + Vec2::splat(ofs), H, WHITE);

        let at = Vec2::new(aspect * 0.4, -0.4 + 2.1 * H);
        renderer.draw_text(&self.hud.status_text, at, 2.0 * H, SHADOW);
        renderer.draw_text(
            &self.hud.status_text,
            at + Vec2::splat(ofs),
            2.0 * H,
            self.hud.status_color,
        );
    }

    fn camera_transform(&self) -> &Transform {
        &self.scene[self.scene.cameras[0].transform]
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn is_game_over(&self) -> bool {
        self.hud.game_over
    }

    pub fn phase(&self) -> JumpPhase {
        self.car.phase
    }

    pub fn car(&self) -> &Car {
        &self.car
    }

    pub fn car_pose(&self) -> &Transform {
        &self.scene[self.car.transform]
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn buttons(&self) -> &Buttons {
        &self.buttons
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn audio(&self) -> &AudioManager<B> {
        &self.audio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::HeadlessAudio;
    use crate::consts::{FRAME_DT, TILE_COUNT};
    use crate::demo;
    use crate::scene::RecordingRenderer;
    use glam::Quat;
    use proptest::prelude::*;

    fn session() -> GameSession<HeadlessAudio> {
        GameSession::new(
            demo::build_scene(3),
            HeadlessAudio::new(),
            Tuning::default(),
            &Settings::default(),
        )
        .unwrap()
    }

    fn new_with(scene: SceneGraph) -> Result<GameSession<HeadlessAudio>, SetupError> {
        GameSession::new(scene, HeadlessAudio::new(), Tuning::default(), &Settings::default())
    }

    /// Park every obstacle far away, then put the front one at `position`
    fn place_obstacle(session: &mut GameSession<HeadlessAudio>, position: Vec3) {
        let ids: Vec<_> = session.world().obstacles.iter().map(|o| o.transform).collect();
        for (i, id) in ids.iter().enumerate() {
            session.scene_mut()[*id].position = Vec3::new(0.0, -300.0 - 50.0 * i as f32, 0.0);
        }
        session.scene_mut()[ids[0]].position = position;
    }

    #[test]
    fn test_setup_errors() {
        let mut scene = demo::build_scene(1);
        let car = scene.find("Car").unwrap();
        scene[car].name = "Truck".into();
        assert_eq!(new_with(scene).err(), Some(SetupError::MissingCar));

        let mut scene = demo::build_scene(1);
        let tile = scene.find_all_containing("Cube")[0];
        scene[tile].name = "Floor".into();
        assert_eq!(
            new_with(scene).err(),
            Some(SetupError::TileCount {
                found: TILE_COUNT - 1,
                expected: TILE_COUNT
            })
        );

        let mut scene = demo::build_scene(1);
        scene.cameras.clear();
        assert_eq!(new_with(scene).err(), Some(SetupError::CameraCount { found: 0 }));

        let mut scene = demo::build_scene(1);
        scene.lights.clear();
        assert_eq!(new_with(scene).err(), Some(SetupError::MissingLight));

        let mut scene = demo::build_scene(1);
        for id in scene.find_all_containing("Box") {
            scene[id].name = "Crate".into();
        }
        assert_eq!(new_with(scene).err(), Some(SetupError::NoObstacles));
    }

    #[test]
    fn test_crash_ends_round() {
        let mut s = session();
        place_obstacle(&mut s, Vec3::new(0.0, -3.0, 0.0));

        s.update(FRAME_DT);
        assert!(s.is_game_over());
        assert_eq!(s.hud().status_text, GAME_OVER_TEXT);
        assert_eq!(s.hud().instruction_text, RESTART_TEXT);
        assert!(s.drain_events().contains(&GameEvent::Crashed));

        // Frozen until jump
        let tiles: Vec<Vec3> = s.world().tiles.iter().map(|&id| s.scene()[id].position).collect();
        s.update(FRAME_DT);
        let after: Vec<Vec3> = s.world().tiles.iter().map(|&id| s.scene()[id].position).collect();
        assert_eq!(tiles, after);
    }

    #[test]
    fn test_far_obstacle_is_harmless() {
        let mut s = session();
        place_obstacle(&mut s, Vec3::new(0.0, -50.0, 0.0));
        s.update(FRAME_DT);
        assert!(!s.is_game_over());
    }

    #[test]
    fn test_restart_after_midair_crash() {
        let mut s = session();
        place_obstacle(&mut s, Vec3::new(0.0, -250.0, 0.0));
        assert!(s.handle_event(InputEvent::KeyDown(Key::W)));
        assert!(s.handle_event(InputEvent::KeyDown(Key::Space)));
        for _ in 0..20 {
            s.update(FRAME_DT);
        }
        assert_eq!(s.phase(), JumpPhase::Rising);
        assert!(s.car_pose().position.z > 0.0);
        assert_ne!(s.car_pose().rotation, Quat::IDENTITY);

        // Drop an obstacle right onto the car
        let car_position = s.car_pose().position;
        place_obstacle(&mut s, car_position);
        s.update(FRAME_DT);
        assert!(s.is_game_over());
        assert!(s.car().is_grounded());
        assert!(!s.buttons().jump.pressed);

        assert!(s.handle_event(InputEvent::KeyUp(Key::Space)));
        assert!(s.handle_event(InputEvent::KeyDown(Key::Space)));
        s.update(FRAME_DT);

        assert!(!s.is_game_over());
        assert_eq!(s.car_pose().position, Vec3::ZERO);
        assert_eq!(s.car_pose().rotation, Quat::IDENTITY);
        assert_eq!(s.car().total_jump_downs, 0);
        assert_eq!(s.hud(), &Hud::default());
        assert_eq!(*s.buttons(), Buttons::default());
        assert!(s.events().contains(&GameEvent::Restarted));
    }

    #[test]
    fn test_held_jump_capped() {
        let mut s = session();
        place_obstacle(&mut s, Vec3::new(0.0, -250.0, 0.0));
        s.handle_event(InputEvent::KeyDown(Key::Space));

        let mut t = 0.0;
        let mut max_z: f32 = 0.0;
        while t < 1.5 - 1e-4 {
            s.update(0.1);
            t += 0.1;
            max_z = max_z.max(s.car_pose().position.z);
        }
        s.update(0.1);
        assert_ne!(s.phase(), JumpPhase::Rising);
        assert!(max_z <= 3.0);
        assert!(s.drain_events().contains(&GameEvent::JumpReleased));
    }

    #[test]
    fn test_jump_key_ignored_midair() {
        let mut s = session();
        place_obstacle(&mut s, Vec3::new(0.0, -250.0, 0.0));
        s.handle_event(InputEvent::KeyDown(Key::Space));
        for _ in 0..10 {
            s.update(FRAME_DT);
        }
        s.handle_event(InputEvent::KeyUp(Key::Space));
        s.update(FRAME_DT);
        assert_eq!(s.phase(), JumpPhase::Falling);

        assert!(s.handle_event(InputEvent::KeyDown(Key::Space)));
        assert!(!s.buttons().jump.pressed);
    }

    #[test]
    fn test_unhandled_events() {
        let mut s = session();
        assert!(!s.handle_event(InputEvent::Other));
        assert!(!s.handle_event(InputEvent::KeyDown(Key::Other(42))));
        assert!(s.handle_event(InputEvent::KeyDown(Key::Escape)));
        assert_eq!(s.drain_events(), vec![GameEvent::PointerReleased]);
    }

    #[test]
    fn test_listener_follows_camera() {
        let mut s = session();
        s.update(FRAME_DT);
        let camera = s.scene()[s.scene().cameras[0].transform].clone();
        let backend = s.audio().backend();
        assert_eq!(backend.listener_position, camera.position);
        assert!((backend.listener_right - camera.rotation * Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_draw_overlay() {
        let mut s = session();
        let mut renderer = RecordingRenderer::default();
        s.draw(UVec2::new(1920, 1080), &mut renderer);

        assert_eq!(renderer.frames, 1);
        assert!((renderer.last_aspect - 1920.0 / 1080.0).abs() < 1e-5);
        let light = renderer.last_light.unwrap();
        assert_eq!(light.position, Vec3::new(0.0, 1.4, 6.0));
        assert_eq!(renderer.texts.len(), 4);
        assert_eq!(renderer.texts[1], (INSTRUCTION_TEXT.to_string(), WHITE));
    }

    proptest! {
        #[test]
        fn prop_session_invariants(
            steps in proptest::collection::vec((0u8..6, 0.0f32..0.1), 1..300),
        ) {
            let mut s = session();
            for (action, dt) in steps {
                match action {
                    0 => { s.handle_event(InputEvent::KeyDown(Key::Space)); }
                    1 => { s.handle_event(InputEvent::KeyUp(Key::Space)); }
                    2 => { s.handle_event(InputEvent::KeyDown(Key::A)); }
                    3 => { s.handle_event(InputEvent::KeyUp(Key::A)); }
                    4 => { s.handle_event(InputEvent::KeyDown(Key::W)); }
                    _ => {}
                }
                s.update(dt);

                prop_assert_eq!(s.world().tiles.len(), TILE_COUNT);
                for pair in s.world().tiles.windows(2) {
                    prop_assert!(s.scene()[pair[0]].position.y >= s.scene()[pair[1]].position.y);
                }
                let z = s.car_pose().position.z;
                prop_assert!((0.0..=3.0).contains(&z));
                if s.car().is_grounded() && !s.is_game_over() {
                    prop_assert_eq!(z, 0.0);
                    prop_assert_eq!(s.car_pose().rotation, Quat::IDENTITY);
                }
            }
        }
    }
}
