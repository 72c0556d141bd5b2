use nalgebra::Vector3;

use std::str::FromStr;

use meshdata::buffer::VertexLayout;

type ParseError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum LogFormat {
    Compact,
    Full,
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Full => f.write_str("full"),
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum LayoutArg {
    Interleaved,
    Separate,
}

impl From<LayoutArg> for VertexLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Interleaved => VertexLayout::Interleaved,
            LayoutArg::Separate => VertexLayout::Separate,
        }
    }
}

#[derive(Debug, Clone, clap::Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Logging output filters; comma-separated
    #[arg(
        short,
        long,
        default_value = "warn,protomesh=info,meshdata=info,viewer=info",
        env = "VIEWER_LOG_FILTER"
    )]
    pub log_filter: String,
    /// Logging output format
    #[arg(long, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
    /// Initial window size, in physical pixels
    #[arg(long, default_value = "640x480", value_parser = parse_size, value_name = "WxH")]
    pub size: (u32, u32),
    /// Initial camera position
    #[arg(long, default_value = "0,1,3", value_parser = parse_vec3::<f32>, value_name = "X,Y,Z", allow_hyphen_values = true)]
    pub camera: Vector3<f32>,
    /// Vertical field of view, in degrees
    #[arg(long, default_value_t = 70.0)]
    pub fov: f32,
    /// Near clipping plane
    #[arg(long, default_value_t = 0.1)]
    pub near: f32,
    /// Far clipping plane
    #[arg(long, default_value_t = 100.0)]
    pub far: f32,
    /// Start in wireframe mode (toggle with Tab)
    #[arg(short, long)]
    pub wireframe: bool,
    /// Vertex layout for every mesh; by default, flat primitives use separate attribute arrays
    /// and curved ones interleave them
    #[arg(long)]
    pub layout: Option<LayoutArg>,
    /// Sphere subdivisions
    #[arg(long, default_value_t = 2)]
    pub subdivisions: u32,
    /// Segments around the cylinder and capsule; also the capsule's latitude segments
    #[arg(long, default_value_t = 16)]
    pub segments: u32,
}

fn parse_vec3<R: FromStr>(s: &str) -> Result<Vector3<R>, ParseError>
where
    <R as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let mut split = s.trim().split(',');
    let mut next = || {
        split
            .next()
            .ok_or_else(|| ParseError::from("expected 3 comma-separated components"))
            .and_then(|c| R::from_str(c.trim()).map_err(ParseError::from))
    };
    let (x, y, z) = (next()?, next()?, next()?);
    if split.next().is_some() {
        return Err("expected 3 comma-separated components".into());
    }
    Ok(nalgebra::vector![x, y, z])
}

fn parse_size(s: &str) -> Result<(u32, u32), ParseError> {
    let (w, h) = s
        .trim()
        .split_once(['x', 'X'])
        .ok_or("expected WIDTHxHEIGHT")?;
    let (w, h) = (u32::from_str(w.trim())?, u32::from_str(h.trim())?);
    if w == 0 || h == 0 {
        return Err("window dimensions must be non-zero".into());
    }
    Ok((w, h))
}

/// Set up pretty log output
pub(crate) fn initialize_tracing(log_filter: &str, log_format: LogFormat) {
    let tsub = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::OffsetTime::new(
            time::UtcOffset::current_local_offset().unwrap_or_else(|e| {
                tracing::warn!("couldn't get local time offset: {:?}", e);
                time::UtcOffset::UTC
            }),
            time::macros::format_description!("[hour]:[minute]:[second]"),
        ))
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_env_filter(log_filter);

    match log_format {
        LogFormat::Compact => tsub.compact().init(),
        LogFormat::Full => tsub.init(),
        LogFormat::Pretty => tsub.pretty().init(),
        LogFormat::Json => tsub.json().init(),
    }
}
