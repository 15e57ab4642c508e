use argh::FromArgs;
use std::path::PathBuf;

use ctdet::data::{CtdetDataset, DatasetConfig, Preset, SampleRng};

#[derive(FromArgs)]
/// Build one training or test sample from a COCO annotation file and log a summary.
struct Args {
    /// path to the COCO json annotation file
    #[argh(option, short = 'a')]
    ann_file: PathBuf,

    /// directory containing the images
    #[argh(option, short = 'i')]
    img_prefix: PathBuf,

    /// optional json file with the dataset configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// index of the image in the annotation file
    #[argh(option, default = "0")]
    index: usize,

    /// build the test sample instead of the training sample
    #[argh(switch)]
    test: bool,

    /// use the VOC preset
    #[argh(switch)]
    voc: bool,

    /// seed of the augmentation generator
    #[argh(option, default = "0")]
    seed: u64,

    /// write the test metadata as json to this file
    #[argh(option)]
    meta_out: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => DatasetConfig::from_json_file(path)?,
        None => DatasetConfig::default(),
    };
    config = config.with_img_prefix(&args.img_prefix);
    if args.voc {
        config = config.with_preset(Preset::Voc);
    }

    let dataset = CtdetDataset::from_coco_file(config, &args.ann_file)?;
    log::info!(
        "dataset with {} images, preset {}",
        dataset.len(),
        dataset.config().preset
    );

    if args.test {
        let sample = dataset.prepare_test_img(args.index)?;
        log::info!("input shape: {:?}", sample.img.shape());
        log::info!("meta: {:?}", sample.meta);

        if let Some(path) = args.meta_out {
            std::fs::write(&path, serde_json::to_string_pretty(&sample.meta)?)?;
            log::info!("metadata written to {}", path.display());
        }
        return Ok(());
    }

    let mut rng = SampleRng::new(args.seed);
    let sample = dataset.prepare_train_img(args.index, &mut rng)?;
    let targets = &sample.targets;

    let (min, max) = sample
        .img
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    log::info!("input shape: {:?}, min: {min}, max: {max}", sample.img.shape());
    log::info!("heatmap shape: {:?}", targets.hm.shape());
    log::info!(
        "objects encoded: {} / {}",
        targets.num_objects(),
        targets.max_objs()
    );

    let class_names = dataset.config().preset.class_names();
    for (class_id, channel) in targets.hm.outer_iter().enumerate() {
        let peaks = channel.iter().filter(|&&v| v == 1.0).count();
        if peaks > 0 {
            let name = class_names.get(class_id).copied().unwrap_or("?");
            log::info!("class {class_id} ({name}): {peaks} peaks");
        }
    }

    Ok(())
}
