#[cfg(feature = "audio")]
mod backend {
    use std::sync::mpsc::{self, Sender};
    use std::thread::{self, JoinHandle};

    use log::{debug, error};
    use rodio::{OutputStream, Sink};

    use crate::audio::{tone::Chime, SoundId};

    enum AudioCommand {
        Play(SoundId),
        Shutdown,
    }

    /// Owns the output device on a dedicated thread; rodio streams are not `Send`.
    pub struct AudioEngine {
        tx: Sender<AudioCommand>,
        worker: Option<JoinHandle<()>>,
    }

    impl AudioEngine {
        pub fn start() -> Result<Self, String> {
            let (tx, rx) = mpsc::channel::<AudioCommand>();

            let worker = thread::Builder::new()
                .name("audio-engine".to_string())
                .spawn(move || {
                    let mut _stream: Option<OutputStream> = None;
                    let mut sink: Option<Sink> = None;

                    fn ensure_sink(
                        stream: &mut Option<OutputStream>,
                        sink: &mut Option<Sink>,
                    ) -> Result<(), String> {
                        if sink.is_none() {
                            let (s, handle) = OutputStream::try_default().map_err(|e| {
                                format!("Failed to create audio output stream: {}", e)
                            })?;
                            let new_sink = Sink::try_new(&handle)
                                .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                            *stream = Some(s);
                            *sink = Some(new_sink);
                        }
                        Ok(())
                    }

                    while let Ok(cmd) = rx.recv() {
                        match cmd {
                            AudioCommand::Play(sound) => {
                                if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                    error!("Error playing sound {}: {}", sound.as_str(), err);
                                    continue;
                                }
                                if let Some(ref s) = sink {
                                    s.append(Chime::new(sound.notes()));
                                }
                            }
                            AudioCommand::Shutdown => break,
                        }
                    }

                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    debug!("Audio engine released output device");
                })
                .map_err(|e| e.to_string())?;

            Ok(Self {
                tx,
                worker: Some(worker),
            })
        }

        pub fn play(&self, sound: SoundId) -> Result<(), String> {
            self.tx
                .send(AudioCommand::Play(sound))
                .map_err(|e| e.to_string())
        }
    }

    impl Drop for AudioEngine {
        fn drop(&mut self) {
            let _ = self.tx.send(AudioCommand::Shutdown);
            if let Some(handle) = self.worker.take() {
                if handle.join().is_err() {
                    error!("Audio engine thread panicked");
                }
            }
        }
    }
}

#[cfg(not(feature = "audio"))]
mod backend {
    use log::debug;

    use crate::audio::{tone::Chime, SoundId};

    /// Stand-in used when the crate is built without the `audio` feature.
    pub struct AudioEngine;

    impl AudioEngine {
        pub fn start() -> Result<Self, String> {
            Ok(Self)
        }

        pub fn play(&self, sound: SoundId) -> Result<(), String> {
            let chime = Chime::new(sound.notes());
            debug!(
                "Sound {} ({} ms, audio output disabled)",
                sound.as_str(),
                chime.duration().as_millis()
            );
            Ok(())
        }
    }
}

pub use backend::AudioEngine;
