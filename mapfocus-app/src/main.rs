use mapfocus::{prelude::*, simulated::LocationReply};

/// Path of an optional JSON session configuration, first CLI argument
fn load_config() -> Result<MapSessionConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|err| MapError::Config(format!("cannot read {}: {}", path, err)))?;
            MapSessionConfig::from_json(&json)
        }
        None => Ok(MapSessionConfig::default()),
    }
}

fn print_snapshot(label: &str, session: &MapSession) {
    match serde_json::to_string(&session.focus_snapshot()) {
        Ok(json) => println!("{:>10} {}", label, json),
        Err(err) => log::warn!("cannot serialize snapshot: {}", err),
    }
}

/// Headless walk-through: boot the map, locate the user, drag the camera
/// around and let it settle, then pull the settled camera into the origin.
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    let provider = Arc::new(SimulatedProvider::default());
    let session = MapSession::new(provider.clone(), config)?;

    session.on_map_ready(|| log::info!("map ready"));
    session.init().await?;
    provider.emit(MapEventKind::MapReady);
    session.wait_until_ready().await;
    print_snapshot("boot", &session);

    provider.set_location(LocationReply::Fix(LatLng::new(40.4168, -3.7038)));
    session.origin().acquire_user_location().await?;
    print_snapshot("located", &session);

    let start = session.origin().center();
    let mut drag = start;
    for _ in 0..8 {
        drag = LatLng::new(drag.lat + 0.0004, drag.lng + 0.0003);
        provider.set_camera_target(drag);
        tokio::time::sleep(Duration::from_millis(150)).await;
        print_snapshot("dragging", &session);
    }

    while session.is_camera_moving() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    print_snapshot("settled", &session);

    session.origin().set_origin_to_camera_center().await?;
    let moved = start.distance_to(&session.origin().center());
    print_snapshot("origin", &session);
    println!("origin moved {:.0} m", moved);

    session.shutdown();
    Ok(())
}
