use std::{env, thread, time::Duration};

use inquire::Select;
use udp3000s_psu::{
    config::load_config,
    logging::initialize_logging,
    psu::Udp3000s,
    system::SystemResourceManager,
    transport::ResourceManager,
    types::ProtectionSetting,
};

// Configuration constants - adjust these for your setup
const CHANNEL: u8 = 1;
const OUTPUT_VOLTAGE_V: f64 = 5.0;
const CURRENT_LIMIT_A: f64 = 0.5;
const OVP_LEVEL_V: f64 = 5.5;
const OCP_LEVEL_A: f64 = 2.1;
// Enable to arm OVP/OCP on the channel before switching on.
const CONFIGURE_PROTECTION: bool = false;
const STABILIZATION_DELAY_MS: u64 = 1000;
const HOLD_DELAY_MS: u64 = 5000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(None)?;
    initialize_logging(&config.logging.log_level);

    let mut manager = SystemResourceManager::new(&config.transport);

    // Get resource from command line arg or interactive selection
    let resource = match env::args().nth(1) {
        Some(resource) => resource,
        None => {
            let resources = manager.list_resources()?;
            if resources.is_empty() {
                eprintln!("No VISA devices found!");
                std::process::exit(1);
            }
            Select::new("Select a PSU resource:", resources).prompt()?
        }
    };

    println!("Using resource: {}", resource);

    let mut psu: Udp3000s<SystemResourceManager> = Udp3000s::open(manager, &resource)?;
    println!("{}", psu.idn()?);

    // Basic setup
    psu.set_voltage(CHANNEL, OUTPUT_VOLTAGE_V)?;
    psu.set_current(CHANNEL, CURRENT_LIMIT_A)?;
    println!(
        "CH{CHANNEL} set to {:.3} V, {:.3} A limit",
        OUTPUT_VOLTAGE_V, CURRENT_LIMIT_A
    );

    if CONFIGURE_PROTECTION {
        psu.set_ovp(CHANNEL, ProtectionSetting::new(OVP_LEVEL_V, true))?;
        psu.set_ocp(CHANNEL, ProtectionSetting::new(OCP_LEVEL_A, true))?;
        println!("OVP: {:?}", psu.get_ovp(CHANNEL)?);
        println!("OCP: {:?}", psu.get_ocp(CHANNEL)?);
    }

    // Enable the output
    psu.set_output(CHANNEL, true)?;
    thread::sleep(Duration::from_millis(STABILIZATION_DELAY_MS));

    // Readback
    let (volts, amps) = psu.get_v_i(CHANNEL)?;
    println!("CH{CHANNEL}: {volts:.3} V, {amps:.3} A");

    thread::sleep(Duration::from_millis(HOLD_DELAY_MS));

    psu.set_output(CHANNEL, false)?;
    println!("Output disabled");
    psu.close()?;
    Ok(())
}
