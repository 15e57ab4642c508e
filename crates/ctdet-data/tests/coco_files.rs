use std::io::Write;

use ctdet_data::{AnnotationStore, CtdetDataset, DatasetConfig, SampleRng};

#[test]
fn prepare_from_files() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir()?;
    image::RgbImage::from_fn(160, 120, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
    .save(dir.path().join("000001.png"))?;

    let ann_file = dir.path().join("instances.json");
    let mut file = std::fs::File::create(&ann_file)?;
    write!(
        file,
        r#"{{
            "images": [{{"id": 1, "file_name": "000001.png", "width": 160, "height": 120}}],
            "annotations": [
                {{"id": 1, "image_id": 1, "bbox": [0, 0, 160, 120], "category_id": 3}},
                {{"id": 2, "image_id": 1, "bbox": [20, 30, 40, 20], "category_id": 1}}
            ],
            "categories": [{{"id": 1, "name": "person"}}, {{"id": 3, "name": "car"}}]
        }}"#
    )?;
    drop(file);

    let config = DatasetConfig::default()
        .with_img_prefix(dir.path())
        .with_img_scale([256, 256]);
    let ds = CtdetDataset::from_coco_file(config, &ann_file)?;
    assert_eq!(ds.len(), 1);
    assert_eq!(ds.store().annotation_ids(1), vec![1, 2]);

    let train = ds.prepare_train_img(0, &mut SampleRng::new(11))?;
    assert_eq!(train.img.shape(), &[3, 256, 256]);
    assert_eq!(train.targets.hm.shape(), &[80, 64, 64]);
    // the full image box is visible in every crop, on the car channel
    assert_eq!(train.targets.reg_mask[0], 1);
    assert!(train.targets.hm.index_axis(ndarray::Axis(0), 2).iter().any(|&v| v == 1.0));

    let test = ds.prepare_test_img(0)?;
    // (160 | 31) + 1, (120 | 31) + 1
    assert_eq!(test.img.shape(), &[3, 128, 192]);
    assert_eq!(test.meta.center, [80.0, 60.0]);
    assert_eq!(test.meta.out_width, 48);
    assert_eq!(test.meta.out_height, 32);

    let meta = serde_json::to_value(&test.meta)?;
    assert_eq!(meta["img_id"], 1);
    assert_eq!(meta["out_width"], 48);
    Ok(())
}

#[test]
fn missing_image_file_reports_the_path() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let ann_file = dir.path().join("instances.json");
    std::fs::write(
        &ann_file,
        r#"{"images": [{"id": 5, "file_name": "gone.jpg"}], "annotations": []}"#,
    )?;

    let config = DatasetConfig::default().with_img_prefix(dir.path());
    let ds = CtdetDataset::from_coco_file(config, &ann_file)?;

    let err = match ds.prepare_test_img(0) {
        Err(err) => err,
        Ok(_) => return Err("expected an error".into()),
    };
    let message = err.to_string();
    assert!(message.contains("image 5"), "{message}");
    assert!(message.contains("gone.jpg"), "{message}");
    Ok(())
}
