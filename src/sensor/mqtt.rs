use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use dotenv::dotenv;
use log::{error, info, warn};
use rumqttc::{Client, Event, LastWill, MqttOptions, Packet, QoS};

use super::{deliver, Delivery, SensorError, SensorSource};
use crate::config::MqttConfig;
use crate::types::{DataPoint, SensorEvent, SensorKind};

/// Readings published by a handset over MQTT.
///
/// Broker settings come from the config file; `MQTT_HOST`, `MQTT_PORT`,
/// `MQTT_USER` and `MQTT_PASS` (environment or `.env`) take precedence.
pub struct MqttSensorSource {
    config: MqttConfig,
    available: Vec<SensorKind>,
    worker: Option<Worker>,
}

struct Worker {
    client: Client,
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl MqttSensorSource {
    pub fn new(config: MqttConfig, available: &[SensorKind]) -> Self {
        Self {
            config,
            available: available.to_vec(),
            worker: None,
        }
    }

    fn mqtt_options(&self) -> Result<MqttOptions, SensorError> {
        dotenv().ok();

        let host = env::var("MQTT_HOST").unwrap_or_else(|_| self.config.broker.clone());
        let port = match env::var("MQTT_PORT") {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|e| SensorError::Connection(format!("invalid MQTT_PORT {}: {}", port, e)))?,
            Err(_) => self.config.port,
        };

        let mut options = MqttOptions::new(self.config.client_id.clone(), host, port);
        if let (Ok(user), Ok(pass)) = (env::var("MQTT_USER"), env::var("MQTT_PASS")) {
            options.set_credentials(user, pass);
        }
        options
            .set_keep_alive(Duration::from_secs(u64::from(self.config.keep_alive)))
            .set_last_will(LastWill::new(
                format!("{}/status", self.config.topic),
                "offline",
                QoS::AtLeastOnce,
                false,
            ));
        Ok(options)
    }
}

impl SensorSource for MqttSensorSource {
    fn name(&self) -> &str {
        "mqtt"
    }

    fn is_available(&self, kind: SensorKind) -> bool {
        self.available.contains(&kind)
    }

    fn subscribe(
        &mut self,
        kinds: &[SensorKind],
        period: Duration,
        sink: Sender<SensorEvent>,
    ) -> Result<(), SensorError> {
        if kinds.is_empty() {
            return Err(SensorError::NoSensors);
        }
        self.unsubscribe();

        let options = self.mqtt_options()?;
        let (client, mut connection) = Client::new(options, 10);
        client
            .subscribe(self.config.topic.clone(), QoS::AtLeastOnce)
            .map_err(|e| SensorError::Connection(e.to_string()))?;

        // The handset decides its own rate; the requested period is advisory.
        info!(
            "Subscribed to MQTT topic {} for {:?} (requested period {:?})",
            self.config.topic, kinds, period
        );

        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);
        let topic = self.config.topic.clone();
        let kinds = kinds.to_vec();

        let handle = thread::Builder::new()
            .name("mqtt-sensors".to_string())
            .spawn(move || {
                for event in connection.iter() {
                    if thread_shutdown.load(Ordering::Relaxed) {
                        info!("MQTT thread received shutdown signal, exiting");
                        break;
                    }

                    match event {
                        Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                            match parse_sensor_data(&publish.payload) {
                                Ok(event) if kinds.contains(&event.kind) => {
                                    if deliver(&sink, event) == Delivery::Disconnected {
                                        info!("Sensor channel disconnected, MQTT thread exiting");
                                        break;
                                    }
                                }
                                Ok(_) => {}
                                Err(e) => warn!("Invalid sensor data: {}", e),
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            if !thread_shutdown.load(Ordering::Relaxed) {
                                error!("MQTT connection error: {}", e);
                            }
                            break;
                        }
                    }
                }
            })?;

        self.worker = Some(Worker { client, shutdown, handle });
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.shutdown.store(true, Ordering::Relaxed);
            if let Err(e) = worker.client.disconnect() {
                warn!("MQTT disconnect failed: {}", e);
            }
            // The event loop ends on the next notification; not joined so the
            // UI thread never waits on the network.
            drop(worker.handle);
            info!("Unsubscribed from MQTT topic {}", self.config.topic);
        }
    }
}

impl Drop for MqttSensorSource {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

pub fn parse_sensor_data(payload: &[u8]) -> Result<SensorEvent, String> {
    let payload_str = std::str::from_utf8(payload).map_err(|e| format!("Invalid UTF-8: {}", e))?;

    serde_json::from_str::<DataPoint>(payload_str)
        .map(SensorEvent::from)
        .map_err(|e| format!("JSON parsing error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector3;

    #[test]
    fn parses_handset_payload() {
        let event = parse_sensor_data(
            br#"{"sensor":"accelerometer","x":0.5,"y":-9.81,"z":1.0,"timestamp":1700000000000}"#,
        )
        .unwrap();
        assert_eq!(event.kind, SensorKind::Accelerometer);
        assert_eq!(event.values, Vector3::new(0.5, -9.81, 1.0));
        assert_eq!(event.timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn timestamp_is_optional() {
        let event = parse_sensor_data(br#"{"sensor":"gyroscope","x":0,"y":0,"z":0}"#).unwrap();
        assert_eq!(event.timestamp_ms, 0);
    }

    #[test]
    fn rejects_unknown_sensor_and_bad_utf8() {
        assert!(parse_sensor_data(br#"{"sensor":"barometer","x":0,"y":0,"z":0}"#).is_err());
        assert!(parse_sensor_data(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn availability_follows_configuration() {
        let source = MqttSensorSource::new(MqttConfig::default(), &[SensorKind::Gyroscope]);
        assert!(source.is_available(SensorKind::Gyroscope));
        assert!(!source.is_available(SensorKind::MagneticField));
    }
}
