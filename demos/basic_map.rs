use macroquad::prelude::*;
use tilemap_engine::{MacroquadTextures, MapDocument};

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Map".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let mut textures = MacroquadTextures::new();
    let map = MapDocument::load("assets/maps/town.tmx", &mut textures)
        .expect("Failed to load map");

    let speed = 120.0;
    let mut player = Rect::new(24.0, 24.0, 10.0, 10.0);

    loop {
        clear_background(BLACK);

        let dt = get_frame_time();
        let mut step = Vec2::ZERO;
        if is_key_down(KeyCode::Left) {
            step.x -= 1.0;
        }
        if is_key_down(KeyCode::Right) {
            step.x += 1.0;
        }
        if is_key_down(KeyCode::Up) {
            step.y -= 1.0;
        }
        if is_key_down(KeyCode::Down) {
            step.y += 1.0;
        }
        let next = player.offset(step * speed * dt);
        if !map.check_collision(next) {
            player = next;
        }

        let origin = vec2(32.0, 32.0);
        map.draw(origin);
        draw_rectangle(
            origin.x + player.x,
            origin.y + player.y,
            player.w,
            player.h,
            YELLOW,
        );

        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            55.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}
