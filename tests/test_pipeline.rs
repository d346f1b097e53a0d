// Pipeline tests
// Author: Gabriel Demetrios Lafis

use data_sweeper::{
    data::{ingest, DataSet, DataType, Row, SchemaBuilder, Value},
    processing::{
        describe, CleaningOptions, DataProcessor, DropDuplicatesFilter, FilterProcessor,
        LowercaseTransform, Pipeline, RenameTransform, SelectTransform,
    },
};

fn csv(text: &str) -> DataSet {
    ingest(text.as_bytes(), "data.csv").unwrap().unwrap()
}

fn letters_and_numbers() -> DataSet {
    let schema = SchemaBuilder::new()
        .add_text("letter", true)
        .add_integer("number", true)
        .build();

    let mut dataset = DataSet::new(schema);
    for (letter, number) in [("a", 1), ("a", 1), ("b", 2)] {
        dataset
            .add_row(Row::new(vec![
                Value::Text(letter.to_string()),
                Value::Integer(number),
            ]))
            .unwrap();
    }
    dataset
}

#[test]
fn test_drop_missing_scenario() {
    let dataset = csv("name,age\nAnn,30\nBob,\nCid,41\n");
    assert_eq!(dataset.schema.fields[1].data_type, DataType::Integer);

    let result = FilterProcessor::drop_missing().process(&dataset).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.column_count(), 2);
    assert_eq!(result.data[1].values[0], Value::Text("Cid".to_string()));
}

#[test]
fn test_drop_duplicates_scenario() {
    let result = DropDuplicatesFilter::new().process(&letters_and_numbers()).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.data[0].values, vec![Value::Text("a".to_string()), Value::Integer(1)]);
    assert_eq!(result.data[1].values, vec![Value::Text("b".to_string()), Value::Integer(2)]);
}

#[test]
fn test_drop_duplicates_is_idempotent() {
    let dataset = csv("a,b\n1,x\n1,x\n2,y\n1,x\n2,y\n3,\n3,\n");
    let filter = DropDuplicatesFilter::new();

    let once = filter.process(&dataset).unwrap();
    let twice = filter.process(&once).unwrap();

    assert_eq!(once.len(), 3);
    assert_eq!(once, twice);
}

#[test]
fn test_drop_missing_never_grows() {
    let inputs = [
        "a,b\n1,2\n3,4\n",
        "a,b\n,2\n3,\n",
        "a,b\n1,NA\nnull,4\n5,6\n",
    ];

    for text in inputs {
        let dataset = csv(text);
        let result = FilterProcessor::drop_missing().process(&dataset).unwrap();

        assert!(result.len() <= dataset.len());
        assert_eq!(result.column_count(), dataset.column_count());
        assert!(result.data.iter().all(|row| !row.has_null()));
    }
}

#[test]
fn test_lowercase_is_idempotent() {
    let dataset = csv("city,n\nOSLO,1\nBergen,2\n,3\n");
    let lowercase = LowercaseTransform::new("city");

    let once = lowercase.process(&dataset).unwrap();
    let twice = lowercase.process(&once).unwrap();

    assert_eq!(once, twice);
    assert_eq!(once.len(), dataset.len());
    assert_eq!(once.data[0].values[0], Value::Text("oslo".to_string()));
    assert_eq!(once.data[2].values[0], Value::Null);
}

#[test]
fn test_rename_then_select_pipeline() {
    let dataset = csv("First Name,Age,City\nAnn,30,Oslo\n");

    let pipeline = Pipeline::new("test")
        .add(RenameTransform::new(vec![
            ("First Name".to_string(), "name".to_string()),
            ("Age".to_string(), "age".to_string()),
        ]))
        .add(SelectTransform::new(vec!["age".to_string(), "name".to_string()]));

    let result = pipeline.process(&dataset).unwrap();

    assert_eq!(result.column_names(), vec!["age", "name"]);
    assert_eq!(
        result.data[0].values,
        vec![Value::Integer(30), Value::Text("Ann".to_string())]
    );
}

#[test]
fn test_unknown_column_is_rejected() {
    let dataset = csv("a,b\n1,2\n");

    assert!(SelectTransform::new(vec!["c".to_string()]).process(&dataset).is_err());
    assert!(LowercaseTransform::new("c").process(&dataset).is_err());
    assert!(RenameTransform::new(vec![("c".to_string(), "d".to_string())])
        .process(&dataset)
        .is_err());
}

#[test]
fn test_full_cleaning_then_describe() {
    let dataset = csv("Name,Score\nAnn,10\nAnn,10\nBob,\nCid,20\nDee,30\n");

    let options = CleaningOptions {
        drop_missing: true,
        drop_duplicates: true,
        ..CleaningOptions::default()
    };
    let cleaned = options.apply(&dataset).unwrap();
    assert_eq!(cleaned.len(), 3);

    let summary = describe(&cleaned);
    assert_eq!(summary.numeric.len(), 1);

    let score = &summary.numeric[0];
    assert_eq!(score.column, "Score");
    assert_eq!(score.count, 3);
    assert_eq!(score.mean, Some(20.0));
    assert_eq!(score.std, Some(10.0));
    assert_eq!(score.min, Some(10.0));
    assert_eq!(score.median, Some(20.0));
    assert_eq!(score.max, Some(30.0));
}

#[test]
fn test_whitespace_cells_survive_drop_missing() {
    let dataset = csv("name,note\nAnn, \nBob,x\n");

    let result = FilterProcessor::drop_missing().process(&dataset).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.data[0].values[1], Value::Text(" ".to_string()));
}

#[test]
fn test_repeated_headers_stay_addressable() {
    let dataset = csv("a,a\n1,X\n2,Y\n");
    assert_eq!(dataset.column_names(), vec!["a", "a.1"]);

    let selected = SelectTransform::new(dataset.column_names()).process(&dataset).unwrap();
    assert_eq!(selected.column_count(), 2);

    let mut options = CleaningOptions {
        lowercase: vec!["letter".to_string()],
        ..CleaningOptions::default()
    };
    options.renames.insert("a.1".to_string(), "letter".to_string());

    let cleaned = options.apply(&dataset).unwrap();
    assert_eq!(cleaned.column_names(), vec!["a", "letter"]);
    assert_eq!(cleaned.data[0].values, vec![Value::Integer(1), Value::Text("x".to_string())]);
}
