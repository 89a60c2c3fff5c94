use std::{thread, time::Duration};

use wooting_rgb_hid::{HidApiBackend, Result, Rgb, WootingRgb, MATRIX_COLS, MATRIX_ROWS};

fn main() -> Result<()> {
    env_logger::init();

    // Optional hex color argument, e.g. `solid_color ff8800`.
    let color = std::env::args()
        .nth(1)
        .and_then(|arg| u32::from_str_radix(arg.trim_start_matches('#'), 16).ok())
        .map(Rgb::from_u32)
        .unwrap_or(Rgb::new(0, 128, 255));

    let backend = HidApiBackend::new()?;
    let keyboard = WootingRgb::open_first(&backend)?;
    println!("Painting '{}' with #{color}", keyboard.device_id());

    // Batch the whole matrix, then upload each bank once.
    keyboard.set_auto_update(false);
    for row in 0..MATRIX_ROWS as u8 {
        for column in 0..MATRIX_COLS as u8 {
            keyboard.set_rgb(row, column, color);
        }
    }
    if !keyboard.update_keyboard() {
        eprintln!("Some banks failed to upload; retrying once.");
        keyboard.update_keyboard();
    }

    thread::sleep(Duration::from_secs(5));
    keyboard.reset_rgb();
    keyboard.close();
    Ok(())
}
