use pretty_assertions::assert_eq;
use sdg_processor::models::{Gas, PhysicalInputs};
use sdg_processor::processors::{
    calc_concentration, calc_saturation, format, Formatter, QualityChecker, SdgPipeline,
};
use sdg_processor::readers::TableReader;
use sdg_processor::utils::constants::{
    EXTERNAL_LAB_DATA_FILE, FIELD_DATA_PROC_FILE, FIELD_SUPER_PARENT_FILE, STACKED_FILES_DIR,
};
use sdg_processor::writers::{write_table, ParquetWriter};
use sdg_processor::{ConcentrationColumns, SaturationColumns};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use validator::Validate;

const LAB_DATA: &str = "\
domainID,siteID,sampleID,concentrationCO2,concentrationCH4,concentrationN2O
D10,ARIK,ARIK.20190514.AIR,405,1.85,0.330
D10,ARIK,ARIK.20190514.EQ,1200,5,0.5
D10,ARIK,ARIK.20190611.AIR,410,1.9,NA
D10,ARIK,ARIK.20190611.EQ,900,40,0.4
D10,ARIK,ARIK.20190611.EQ,905,41,0.41
";

const FIELD_DATA: &str = "\
waterSampleID,referenceAirSampleID,equilibratedAirSampleID,collectDate,processedDate,namedLocation,ptBarometricPressure,storageWaterTemp,waterVolumeSyringe,gasVolumeSyringe
ARIK.20190514.W,ARIK.20190514.AIR,ARIK.20190514.EQ,2019-05-14T15:20Z,2019-05-14,ARIK.AOS.S2,98,22,40,20
ARIK.20190611.W,ARIK.20190611.AIR,ARIK.20190611.EQ,2019-06-11T14:05Z,2019-06-11,ARIK.AOS.S2,85.5,,,20
ARIK.20190709.W,ARIK.20190709.AIR,ARIK.20190709.EQ,2019-07-09T16:40Z,2019-07-09,ARIK.AOS.S2,86.1,19,40,20
";

const SUPER_PARENT: &str = "\
parentSampleID,waterTemp,collectDate
ARIK.20190514.W,15,2019-05-14T15:20Z
ARIK.20190611.W,18.5,2019-06-11T14:05Z
";

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value should be present");
    assert!(
        (actual - expected).abs() <= 1e-9 * expected.abs(),
        "actual {} differs from expected {}",
        actual,
        expected
    );
}

/// A download directory laid out the way the stacking step leaves it.
fn download_dir(temp: &TempDir) -> PathBuf {
    let download = temp.path().join("NEON_dissolved-gases-surfacewater");
    let stacked = download.join(STACKED_FILES_DIR);
    std::fs::create_dir_all(&stacked).unwrap();
    std::fs::write(stacked.join(EXTERNAL_LAB_DATA_FILE), LAB_DATA).unwrap();
    std::fs::write(stacked.join(FIELD_DATA_PROC_FILE), FIELD_DATA).unwrap();
    std::fs::write(stacked.join(FIELD_SUPER_PARENT_FILE), SUPER_PARENT).unwrap();
    download
}

fn zip_path(download: &Path) -> PathBuf {
    download.with_extension("zip")
}

#[tokio::test]
async fn test_pipeline_from_download_directory() {
    let temp = TempDir::new().unwrap();
    let download = download_dir(&temp);

    let (table, report) = SdgPipeline::new(2)
        .process_directory(&zip_path(&download), None)
        .await
        .unwrap();

    assert_eq!(table.num_rows(), 3);
    assert_close(table.float_column("dissolvedCO2").unwrap()[0], 5.799075129005572e-05);
    assert_close(table.float_column("satConcCO2").unwrap()[0], 1.731879822154731e-05);
    assert_close(table.float_column("CO2PercSat").unwrap()[0], 334.8428138501325);

    // The June equilibrated sample was analysed twice, so it stays unmatched.
    assert_eq!(table.float_column("concentrationCO2Gas").unwrap()[1], None);
    assert_eq!(table.float_column("dissolvedCO2").unwrap()[1], None);

    // July has no lab records at all; its reference air falls back to background.
    assert_eq!(
        table.float_column("concentrationN2OAir").unwrap(),
        vec![Some(0.330), Some(0.330), Some(0.330)]
    );

    // June: headspace temperature backfilled from the water temperature.
    assert_eq!(table.float_column("headspaceTemp").unwrap()[1], Some(18.5));
    assert_eq!(table.float_column("waterVolume").unwrap()[1], Some(40.0));
    assert_eq!(table.float_column("volH2OSource").unwrap(), vec![Some(0.0), Some(1.0), Some(0.0)]);

    assert_eq!(report.total_samples, 3);
    assert_eq!(report.defaulted_water_volumes, 1);
    let summary = QualityChecker::new().generate_summary(&report);
    assert!(summary.contains("Total Samples: 3"));
}

#[tokio::test]
async fn test_async_and_blocking_format_agree() {
    let temp = TempDir::new().unwrap();
    let download = download_dir(&temp);

    let awaited = Formatter::new().format_directory(&download).await.unwrap();
    let blocking = format(&download).unwrap();

    assert_eq!(awaited, blocking);
    assert_eq!(awaited.column_names().len(), 19);
}

#[test]
fn test_staged_calculation_through_files() {
    let temp = TempDir::new().unwrap();
    let download = download_dir(&temp);
    let parquet = ParquetWriter::new();

    let formatted = format(&download).unwrap();
    let formatted_path = temp.path().join("output").join("sdg-formatted.csv");
    write_table(&formatted, &formatted_path, &parquet).unwrap();

    let concentration =
        calc_concentration(formatted_path.as_path(), &ConcentrationColumns::default()).unwrap();
    let concentration_path = temp.path().join("output").join("sdg-concentration.parquet");
    write_table(&concentration, &concentration_path, &parquet).unwrap();

    let saturation =
        calc_saturation(concentration_path.as_path(), &SaturationColumns::default()).unwrap();

    assert_close(saturation.float_column("CO2PercSat").unwrap()[0], 334.8428138501325);
    for gas in Gas::ALL {
        assert!(saturation.has_column(&gas.percent_saturation_column()));
    }

    let info = parquet.get_file_info(&concentration_path).unwrap();
    assert_eq!(info.total_rows, 3);
}

#[test]
fn test_result_round_trips_through_csv() {
    let temp = TempDir::new().unwrap();
    let download = download_dir(&temp);

    let formatted = format(&download).unwrap();
    let concentration = calc_concentration(formatted, &ConcentrationColumns::default()).unwrap();
    let result = calc_saturation(concentration, &SaturationColumns::default()).unwrap();

    let path = temp.path().join("sdg-saturation.csv");
    write_table(&result, &path, &ParquetWriter::new()).unwrap();
    let read = TableReader::new().read_table(&path).unwrap();

    for gas in Gas::ALL {
        for column in [gas.dissolved_column(), gas.percent_saturation_column()] {
            assert_eq!(
                read.float_column(&column).unwrap(),
                result.float_column(&column).unwrap()
            );
        }
    }
}

#[test]
fn test_physical_inputs_plausibility() {
    let inputs = PhysicalInputs {
        water_sample_id: Some("ARIK.20190514.W".to_string()),
        barometric_pressure: Some(98.0),
        water_temp: Some(15.0),
        headspace_temp: Some(22.0),
        water_volume: Some(40.0),
        gas_volume: Some(20.0),
    };
    assert!(inputs.validate().is_ok());

    let boiling = PhysicalInputs {
        water_temp: Some(100.0),
        ..inputs
    };
    assert!(boiling.validate().is_err());
}
