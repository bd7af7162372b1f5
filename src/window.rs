use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
}

/// Keyboard and mouse state fed into the simulation each frame. Mouse
/// motion accumulates between polls and is drained with
/// [`take_mouse_delta`](InputState::take_mouse_delta).
#[derive(Debug, Default, Clone, Copy)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub mouse_captured: bool,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
}

impl InputState {
    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        let delta = (self.mouse_dx, self.mouse_dy);
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        delta
    }
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the delta time
    /// in seconds since the last call.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> f32 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < FRAME_TARGET_TIME as u64 {
            let time_to_wait = (FRAME_TARGET_TIME as u64) - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time as f32 / 1000.0
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    texture: sdl2::render::Texture<'static>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    mouse: sdl2::mouse::MouseUtil,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;
        let mouse = sdl_context.mouse();

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // We ensure texture is dropped before texture_creator by struct field order.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        // ABGR on little-endian machines reads the buffer as r,g,b,a bytes.
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ABGR8888, width, height)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture_creator,
            texture,
            event_pump,
            timer_subsystem,
            mouse,
            width,
            height,
        })
    }

    /// Drains the SDL event queue into `input`. Mouse look engages on the
    /// first click and Escape quits.
    pub fn poll_events(&mut self, input: &mut InputState) -> WindowEvent {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return WindowEvent::Quit,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => Self::set_key(input, key, true),
                Event::KeyUp {
                    keycode: Some(key), ..
                } => Self::set_key(input, key, false),
                Event::MouseButtonDown { .. } => {
                    if !input.mouse_captured {
                        input.mouse_captured = true;
                        self.mouse.set_relative_mouse_mode(true);
                    }
                }
                Event::MouseMotion { xrel, yrel, .. } => {
                    if input.mouse_captured {
                        input.mouse_dx += xrel as f32;
                        input.mouse_dy += yrel as f32;
                    }
                }
                _ => {}
            }
        }
        WindowEvent::None
    }

    fn set_key(input: &mut InputState, key: Keycode, pressed: bool) {
        match key {
            Keycode::W | Keycode::Up => input.forward = pressed,
            Keycode::S | Keycode::Down => input.backward = pressed,
            Keycode::A | Keycode::Left => input.strafe_left = pressed,
            Keycode::D | Keycode::Right => input.strafe_right = pressed,
            _ => {}
        }
    }

    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_delta_drains_on_take() {
        let mut input = InputState {
            mouse_dx: 3.0,
            mouse_dy: -2.0,
            ..InputState::default()
        };
        assert_eq!(input.take_mouse_delta(), (3.0, -2.0));
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
    }
}
