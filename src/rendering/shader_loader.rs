use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, channel},
        Arc,
    },
    time::Duration,
};

use anyhow::Context;
use id_arena::{Arena, Id};
use notify_debouncer_mini::{
    new_debouncer_opt, notify::*, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::{PollType, RenderPipeline};

pub const SHADER_FOLDER: &str = "assets/shaders";

pub(crate) type PipelineFactory = Box<
    dyn Sync
        + Send
        + Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<wgpu::RenderPipeline>,
>;

/// A WGSL shader compiled into the binary. When `SHADER_FOLDER` exists on disk
/// the file at `path` takes precedence and is watched for edits.
#[derive(Debug, Clone)]
pub(crate) struct ShaderDefinition {
    pub name: &'static str,
    pub path: &'static str,
    pub source: &'static str,
}

impl ShaderDefinition {
    fn load_source(&self, folder: Option<&Path>) -> anyhow::Result<Cow<'static, str>> {
        let Some(folder) = folder else {
            return Ok(Cow::Borrowed(self.source));
        };

        let path = folder.join(self.path);
        if !path.is_file() {
            return Ok(Cow::Borrowed(self.source));
        }

        std::fs::read_to_string(&path)
            .map(Cow::Owned)
            .with_context(|| format!("Failed to read shader file {}", path.display()))
    }
}

pub struct ShaderEntry {
    pipeline_id: PipelineId,
    def: ShaderDefinition,
    factory: PipelineFactory,
}

pub type PipelineId = Id<PipelineCacheEntry>;

#[derive(Default)]
pub struct PipelineCacheEntry(Option<wgpu::RenderPipeline>);

impl PipelineCacheEntry {
    pub fn set_pipeline(&mut self, pipeline: wgpu::RenderPipeline) {
        self.0 = Some(pipeline);
    }
}

pub struct PipelineCacheBuilder {
    shaders: Arena<ShaderEntry>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self {
            shaders: Arena::new(),
            pipelines: Arena::new(),
        }
    }

    pub(crate) fn add_shader(
        &mut self,
        def: ShaderDefinition,
        factory: PipelineFactory,
    ) -> PipelineId {
        let pipeline_id = self.pipelines.alloc(PipelineCacheEntry::default());
        self.shaders.alloc(ShaderEntry {
            pipeline_id,
            def,
            factory,
        });
        pipeline_id
    }

    pub fn build(self) -> PipelineCache {
        PipelineCache {
            shaders: Arc::new(self.shaders),
            pipelines: self.pipelines,
        }
    }
}

pub struct PipelineCache {
    shaders: Arc<Arena<ShaderEntry>>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCache {
    /// Pipelines are all compiled before the cache is handed out, so a
    /// missing entry is a bug in pass setup.
    pub fn get(&self, id: PipelineId) -> Option<&RenderPipeline> {
        self.pipelines.get(id).and_then(|entry| entry.0.as_ref())
    }

    fn get_entry_mut(&mut self, id: PipelineId) -> Option<&mut PipelineCacheEntry> {
        self.pipelines.get_mut(id)
    }
}

// Compiles all pipelines up front, then recompiles edited shaders on the watcher thread.
pub(crate) struct ShaderLoader {
    pub cache: PipelineCache,
    receiver: mpsc::Receiver<(&'static str, PipelineId, wgpu::RenderPipeline)>,
    _debouncer: Option<Debouncer<RecommendedWatcher>>,
}

impl ShaderLoader {
    pub fn new(device: wgpu::Device, cache_builder: PipelineCacheBuilder) -> anyhow::Result<Self> {
        let mut cache = cache_builder.build();
        let shader_folder = Path::new(SHADER_FOLDER).canonicalize().ok();

        let shaders = cache.shaders.clone();
        for (_, shader) in shaders.iter() {
            let pipeline = compile_shader(&device, shader, shader_folder.as_deref())
                .with_context(|| format!("Failed to compile shader: {}", shader.def.name))?;
            if let Some(entry) = cache.get_entry_mut(shader.pipeline_id) {
                entry.set_pipeline(pipeline);
            }
        }

        let (send_new_pipelines, recv_new_pipelines) = channel();

        let debouncer = match shader_folder {
            Some(folder) => Some(watch_shaders(
                device,
                shaders,
                folder,
                send_new_pipelines,
            )?),
            None => {
                log::info!("No {} folder, shader hot reload disabled", SHADER_FOLDER);
                None
            }
        };

        Ok(Self {
            cache,
            receiver: recv_new_pipelines,
            _debouncer: debouncer,
        })
    }

    pub(crate) fn load_pending_shaders(&mut self) {
        while let Ok((name, pipeline_id, pipeline)) = self.receiver.try_recv() {
            if let Some(entry) = self.cache.get_entry_mut(pipeline_id) {
                log::info!("Shader reloaded: {}", name);
                entry.set_pipeline(pipeline);
            }
        }
    }
}

fn watch_shaders(
    device: wgpu::Device,
    shaders: Arc<Arena<ShaderEntry>>,
    folder: PathBuf,
    sender: mpsc::Sender<(&'static str, PipelineId, wgpu::RenderPipeline)>,
) -> anyhow::Result<Debouncer<RecommendedWatcher>> {
    let watched_folder = folder.clone();

    let mut debouncer: Debouncer<RecommendedWatcher> = new_debouncer_opt(
        notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
        move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    if event.kind != DebouncedEventKind::Any {
                        continue;
                    }

                    // One file can back several pipelines.
                    let affected = shaders
                        .iter()
                        .map(|(_, entry)| entry)
                        .filter(|entry| event.path.ends_with(entry.def.path));

                    for shader in affected {
                        match compile_shader(&device, shader, Some(&watched_folder)) {
                            Ok(pipeline) => {
                                if sender
                                    .send((shader.def.name, shader.pipeline_id, pipeline))
                                    .is_err()
                                {
                                    return;
                                }
                            }
                            Err(e) => log::error!("Failed to reload shader: {:?}", e),
                        }
                    }
                }
            }
            Err(e) => log::warn!("Error debouncing shader changes: {}", e),
        },
    )
    .context("Failed to create shader watcher")?;

    debouncer
        .watcher()
        .watch(&folder, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", folder.display()))?;

    log::info!("Watching {} for shader changes", folder.display());

    Ok(debouncer)
}

fn compile_shader(
    device: &wgpu::Device,
    shader: &ShaderEntry,
    folder: Option<&Path>,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let source = shader.def.load_source(folder)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = (shader.factory)(device, &shader.def, &source);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        return Err(anyhow::anyhow!(
            "Shader compilation failed for {}: {}",
            shader.def.name,
            error
        ));
    }

    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEF: ShaderDefinition = ShaderDefinition {
        name: "Test",
        path: "does_not_exist.wgsl",
        source: "// embedded",
    };

    #[test]
    fn embedded_source_is_the_fallback() {
        assert_eq!(DEF.load_source(None).unwrap(), "// embedded");
        assert_eq!(
            DEF.load_source(Some(Path::new("no/such/folder"))).unwrap(),
            "// embedded"
        );
    }

    #[test]
    fn disk_source_wins_when_present() {
        let folder = std::env::temp_dir().join(format!("shader-loader-{}", std::process::id()));
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(DEF.path), "// on disk").unwrap();

        let source = DEF.load_source(Some(&folder)).unwrap();
        std::fs::remove_dir_all(&folder).unwrap();

        assert_eq!(source, "// on disk");
    }
}
