use std::time::Duration;
use log::*;
use rga100::{
    Rga, Config, Error,
    serial::SerialTransport,
    };

/// mass watched by this monitor, nitrogen
const MASS: u16 = 28;

#[tokio::main]
async fn main() {
    env_logger::init();
    
    let path = std::env::args().nth(1).unwrap_or_else(|| "/dev/ttyUSB0".to_owned());
    info!("opening instrument on {}", path);
    let transport = SerialTransport::open(&path).expect("failed to open serial port");
    let mut rga = Rga::new(transport, Config::default());
    
    rga.begin().await.expect("instrument did not start");
    rga.set_noise_floor(0).await.expect("failed to set noise floor");
    rga.calibrate_all().await.expect("calibration failed");
    println!("total pressure: {}", rga.total_pressure().await.expect("failed to read total pressure"));
    
    loop {
        match rga.scan_mass(MASS).await {
            // previous scan still in flight
            Ok(()) | Err(Error::InvalidState) => {},
            Err(error) => warn!("failed to start scan: {}", error),
        }
        if let Some(current) = rga.read_mass() {
            println!("mass {} current: {}", MASS, current);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
