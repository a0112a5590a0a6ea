//! Keyboard edge tracking
//!
//! Raw key-down/key-up events become five button states. Counters record edges since
//! the last read; `pressed`/`released` record the current level.


/// Physical keys the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    D,
    W,
    S,
    Space,
    Escape,
    /// Anything else; carries the host's key code
    Other(u32),
}

/// Host event fed into `GameSession::handle_event`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Window focus, mouse motion, etc.
    Other,
}

/// Logical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    Left,
    Right,
    Up,
    Down,
    Jump,
}

impl ButtonKind {
    /// Key binding (WASD + space)
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::A => Some(ButtonKind::Left),
            Key::D => Some(ButtonKind::Right),
            Key::W => Some(ButtonKind::Up),
            Key::S => Some(ButtonKind::Down),
            Key::Space => Some(ButtonKind::Jump),
            _ => None,
        }
    }
}

/// Edge-tracked button state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Button {
    /// Key-down edges since the counter was last consumed (wraps)
    pub down_count: u8,
    /// Currently held
    pub pressed: bool,
    /// Set on key-up, stays set until consumed
    pub released: bool,
}

impl Button {
    fn press(&mut self) {
        self.down_count = self.down_count.wrapping_add(1);
        self.pressed = true;
        self.released = false;
    }

    fn release(&mut self) {
        self.pressed = false;
        self.released = true;
    }

    /// Force the button up, as if the key had been released
    pub fn force_release(&mut self) {
        self.release();
    }

    /// Return the pending down count and zero it
    pub fn take_downs(&mut self) -> u8 {
        std::mem::take(&mut self.down_count)
    }
}

/// The five tracked buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub left: Button,
    pub right: Button,
    pub up: Button,
    pub down: Button,
    pub jump: Button,
}

impl Buttons {
    pub fn get_mut(&mut self, kind: ButtonKind) -> &mut Button {
        match kind {
            ButtonKind::Left => &mut self.left,
            ButtonKind::Right => &mut self.right,
            ButtonKind::Up => &mut self.up,
            ButtonKind::Down => &mut self.down,
            ButtonKind::Jump => &mut self.jump,
        }
    }

    /// Record a key-down edge. Jump is ignored while airborne but still reported as handled.
    pub fn on_key_down(&mut self, key: Key, car_grounded: bool) -> bool {
        let Some(kind) = ButtonKind::from_key(key) else {
            return false;
        };
        if kind == ButtonKind::Jump && !car_grounded {
            return true;
        }
        self.get_mut(kind).press();
        true
    }

    /// Record a key-up edge
    pub fn on_key_up(&mut self, key: Key) -> bool {
        let Some(kind) = ButtonKind::from_key(key) else {
            return false;
        };
        self.get_mut(kind).release();
        true
    }

    /// Steering snapshot for the jump axis selection
    pub fn steering(&self) -> Steering {
        Steering {
            left: self.left.pressed,
            right: self.right.pressed,
            up: self.up.pressed,
        }
    }
}

/// Horizontal input held at the moment the jump axis is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Steering {
    pub left: bool,
    pub right: bool,
    pub up: bool,
}
