use burn::backend::NdArray;
use burn::config::Config;
use burn::prelude::{Backend, Tensor};
use burn::tensor::Distribution;
use clap::{Parser, arg};
use conditioning_resizer::conditioning::{
    ATTENTION_BIAS_KEY, COND_POOLED_KEY, CROSS_ATTN_KWARGS_KEY, POOLED_OUTPUT_KEY,
};
use conditioning_resizer::{
    CondMap, CondValue, ConditioningEntry, ConditioningResizerConfig, ResizeMethod,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type DemoBackend = NdArray<f32>;

// $ --target-length=77 --resize-method=interpolate --seq-len=16
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Load resizer settings from a JSON config; overrides the flags below.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective resizer config to this path.
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Target sequence length.
    #[arg(long, default_value_t = 5273)]
    target_length: usize,

    /// Resize method: ``pad_or_trim`` or ``interpolate``.
    #[arg(long, default_value = "pad_or_trim")]
    resize_method: ResizeMethod,

    /// Fill value for ``pad_or_trim``.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pad_value: f64,

    /// Batch size of the synthetic bias.
    #[arg(long, default_value_t = 1)]
    batch: usize,

    /// Heads of the synthetic bias.
    #[arg(long, default_value_t = 2)]
    heads: usize,

    /// Sequence length of the synthetic bias.
    #[arg(long, default_value_t = 8)]
    seq_len: usize,
}

fn synthetic_conditioning<B: Backend>(
    args: &Args,
    device: &B::Device,
) -> Vec<ConditioningEntry<B>> {
    let bias: Tensor<B, 4> = Tensor::random(
        [args.batch, args.heads, args.seq_len, args.seq_len],
        Distribution::Normal(0.0, 1.0),
        device,
    );

    let mut cross_attn = CondMap::new();
    cross_attn.insert(ATTENTION_BIAS_KEY.to_string(), bias.into());

    let mut payload = CondMap::new();
    payload.insert(
        POOLED_OUTPUT_KEY.to_string(),
        Tensor::<B, 2>::zeros([args.batch, 768], device).into(),
    );
    payload.insert(
        COND_POOLED_KEY.to_string(),
        Tensor::<B, 2>::zeros([args.batch, 768], device).into(),
    );
    payload.insert(CROSS_ATTN_KWARGS_KEY.to_string(), cross_attn.into());

    let mut aux = CondMap::new();
    aux.insert("strength".to_string(), 1.0f64.into());

    vec![
        ConditioningEntry::new(payload, aux),
        // Not a text-encoder payload; passed through.
        ConditioningEntry::new(
            Tensor::<B, 3>::zeros([args.batch, args.seq_len, 64], device),
            CondValue::Null,
        ),
    ]
}

fn describe<B: Backend>(value: &CondValue<B>) -> String {
    match value {
        CondValue::Tensor(t) => format!("tensor{:?}", t.dims()),
        CondValue::Map(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", describe(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        other => other.type_name().to_string(),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConditioningResizerConfig::load(path)?,
        None => ConditioningResizerConfig::new()
            .with_target_length(args.target_length)
            .with_resize_method(args.resize_method)
            .with_pad_value(args.pad_value),
    };
    if let Some(path) = &args.save_config {
        config.save(path)?;
    }

    let resizer = config.init()?;
    tracing::info!(?resizer, "resizer ready");

    let device = Default::default();
    let conditioning = synthetic_conditioning::<DemoBackend>(&args, &device);

    let resized = resizer.resize(&conditioning)?;

    for (idx, (before, after)) in conditioning.iter().zip(&resized).enumerate() {
        println!("entry {idx}:");
        println!("  in:  {}", describe(&before.payload));
        println!("  out: {}", describe(&after.payload));
    }

    Ok(())
}
