use wooting_rgb_hid::{enumerate, HidApiBackend, Result};

fn main() -> Result<()> {
    env_logger::init();
    let backend = HidApiBackend::new()?;

    println!(
        "Searching for Wooting keyboards (VID=0x{:04X})...",
        wooting_rgb_hid::WOOTING_VID
    );
    let groups = enumerate(&backend)?;
    if groups.is_empty() {
        println!("No keyboards found.");
        return Ok(());
    }

    println!("Found {} keyboard(s):", groups.len());
    for (device_id, interfaces) in &groups {
        println!("  {device_id}:");
        for info in interfaces {
            println!(
                "    PID=0x{:04X}, Interface={}, Product='{}'",
                info.pid,
                info.interface_number,
                info.product_string.as_deref().unwrap_or("N/A"),
            );
        }
    }
    Ok(())
}
