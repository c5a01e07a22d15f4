use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use station_normalizer::models::{Attributes, Catalog};
use station_normalizer::processors::{ResolveContext, VersionAdapter};
use station_normalizer::readers::CatalogReader;
use station_normalizer::settings::Settings;
use station_normalizer::utils::canonical_name;

// Catalog with one parameter and one sensor parameter per feed
fn create_test_catalog(feed_count: usize) -> Value {
    let parameters: Vec<Value> = (0..feed_count)
        .map(|i| {
            json!({
                "id": i, "idParameterGroup": 1, "idParameterType": 1,
                "urn": format!("urn:parameter:{}", i),
                "parameterName": format!("sea_water_temperature_{}", i),
                "label": format!("Water Temperature {}", i)
            })
        })
        .collect();
    let sensor_parameters: Vec<Value> = (0..feed_count)
        .map(|i| {
            json!({
                "id": 1000 + i, "parameterId": i, "unitId": 1,
                "cellMethods": "time: mean", "timeInterval": "PT6M", "verticalDatum": ""
            })
        })
        .collect();

    json!({
        "units": [{"id": 1, "unit": "degree_Celsius", "label": "Degrees Celsius", "unitSystem": "METRIC"}],
        "parameterTypeUnits": [
            {"idParameterType": 1, "idUnit": 1, "unitSystemDefault": true, "parameterTypeDefault": true}
        ],
        "parameters": parameters,
        "sensorParameters": sensor_parameters,
        "agents": [
            {"id": 1, "label": "Owner", "slug": "org.owner", "sectorType": "academic", "url": "http://owner", "contact": null, "country": null},
            {"id": 2, "label": "Publisher", "slug": "org.pub", "sectorType": "nonprofit", "url": null, "contact": null, "country": null}
        ],
        "agentAssociationTypes": [{"name": "owner", "roleCode": "originator"}]
    })
}

fn create_test_station(feed_count: usize) -> Value {
    let feeds: Vec<Value> = (0..feed_count)
        .map(|i| json!({"id": i, "sensorParameterId": 1000 + i, "discriminant": null, "minZ": -1.0, "maxZ": 0.0}))
        .collect();

    json!({
        "data": {
            "stations": [{
                "id": 1, "label": "Bench Buoy", "uuid": "urn:bench", "platformType": "buoy",
                "location": {"coordinates": [-82.9, 27.1]},
                "feedStats": {"startDate": "2017-12-11T18:05:00Z", "endDate": "2018-10-18T21:34:59Z"},
                "affiliations": [
                    {"agentId": 1, "type": "owner", "foreignUrl": "http://owner/1"},
                    {"agentId": 2, "type": "publisher"}
                ]
            }],
            "deviceFeeds": feeds
        }
    })
}

// One group per feed, each with `rows` rows of value + QC flag
fn create_test_payload(feed_count: usize, rows: usize) -> Value {
    let groups: Vec<Value> = (0..feed_count)
        .map(|feed| {
            let data: Vec<Value> = (0..rows)
                .map(|r| json!([1_513_015_500 + r * 360, 1.0, 15.0 + r as f64 * 0.01, 1, "11111111111"]))
                .collect();
            json!({
                "metadata": {
                    "time": {"index": 0}, "z": {"index": 1},
                    "values": [{"index": 2, "deviceFeedIds": [feed]}],
                    "qartod": [{"index": 3, "testsIndex": 4}]
                },
                "data": data
            })
        })
        .collect();
    json!({"data": {"groupedFeeds": groups}})
}

fn benchmark_catalog_parse(c: &mut Criterion) {
    let document = create_test_catalog(200);

    c.bench_function("catalog_parse", |b| {
        b.iter(|| {
            let catalog = CatalogReader::new().parse(black_box(&document)).unwrap();
            black_box(catalog.summary().sensor_parameters)
        })
    });
}

fn benchmark_canonical_names(c: &mut Criterion) {
    let catalog = CatalogReader::new().parse(&create_test_catalog(50)).unwrap();
    let sensor_parameters: Vec<_> = (0..50)
        .filter_map(|i| catalog.sensor_parameter(1000 + i).ok().cloned())
        .collect();

    c.bench_function("canonical_names", |b| {
        b.iter(|| {
            let names: Vec<String> = sensor_parameters
                .iter()
                .map(|sp| canonical_name(sp, "aux"))
                .collect();
            black_box(names.len())
        })
    });
}

fn benchmark_station_resolution(c: &mut Criterion) {
    let catalog: Catalog = CatalogReader::new().parse(&create_test_catalog(50)).unwrap();
    let settings = Settings::default();
    let document = create_test_station(50);

    c.bench_function("station_resolution", |b| {
        b.iter(|| {
            let ctx = ResolveContext::new(&catalog, &settings);
            let resolved = VersionAdapter::detect(&document)
                .and_then(|adapter| adapter.resolve(&document, &ctx, Attributes::new()))
                .unwrap();
            black_box(resolved.columns.len())
        })
    });
}

fn benchmark_table_assembly_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouped_assembly_by_rows");
    let catalog = CatalogReader::new().parse(&create_test_catalog(10)).unwrap();
    let settings = Settings::default();
    let document = create_test_station(10);
    let ctx = ResolveContext::new(&catalog, &settings);
    let adapter = VersionAdapter::detect(&document).unwrap();
    let resolved = adapter.resolve(&document, &ctx, Attributes::new()).unwrap();

    for &rows in &[10, 100, 1000] {
        let payload = create_test_payload(10, rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &payload, |b, payload| {
            b.iter(|| {
                let table = adapter.assemble(&resolved.station, black_box(payload)).unwrap();
                black_box(table.row_count())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_catalog_parse,
    benchmark_canonical_names,
    benchmark_station_resolution,
    benchmark_table_assembly_by_size
);
criterion_main!(benches);
