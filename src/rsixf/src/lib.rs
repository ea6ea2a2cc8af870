mod ixf;
pub mod output;

pub use ixf::*;

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::ixf::testutil::*;

    #[derive(Default)]
    struct Collector {
        table: Option<TableDescriptor>,
        rows: Vec<(u64, Vec<Value>)>,
        table_defs: u32,
        ends: u32,
    }

    impl Sink for Collector {
        fn on_table_def(&mut self, table: &TableDescriptor) -> Result<(), IxfError> {
            assert!(self.rows.is_empty(), "table definition arrived after rows");
            self.table_defs += 1;
            self.table = Some(table.clone());
            Ok(())
        }

        fn on_row(&mut self, row_index: u64, row: &[Value]) -> Result<(), IxfError> {
            assert_eq!(self.table_defs, 1, "row arrived before the table definition");
            self.rows.push((row_index, row.to_vec()));
            Ok(())
        }

        fn on_end(&mut self) -> Result<(), IxfError> {
            self.ends += 1;
            Ok(())
        }
    }

    fn stream(parts: Vec<Vec<u8>>) -> Vec<u8> {
        parts.concat()
    }

    fn int_column() -> ColumnSpec<'static> {
        ColumnSpec {
            name: "N",
            nullable: false,
            type_code: 496,
            sb_code_page: "00000",
            data_len: 4,
            cid: 1,
            pos: 1,
        }
    }

    fn int_table(values: &[i32]) -> Vec<u8> {
        let mut parts = vec![
            header_record("01208", "00000"),
            table_record("NUMBERS.ixf", 1),
            column_record(int_column()),
        ];
        for v in values {
            parts.push(data_record(1, &v.to_le_bytes()));
        }
        stream(parts)
    }

    fn run_bytes(bytes: &[u8], options: IxfOptions) -> (IxfParser, Collector) {
        let mut parser = IxfParser::new(options);
        let mut sink = Collector::default();
        parser
            .process(&mut Cursor::new(bytes.to_vec()), &mut sink)
            .unwrap();
        (parser, sink)
    }

    #[test]
    fn integer_rows_arrive_in_order() {
        let (parser, sink) = run_bytes(&int_table(&[1, 2, 3]), IxfOptions::default());

        assert_eq!(sink.table_defs, 1);
        assert_eq!(sink.ends, 1);
        assert_eq!(sink.table.as_ref().unwrap().name, "NUMBERS");
        assert_eq!(parser.rows_emitted(), 3);

        let rows: Vec<_> = sink.rows.iter().map(|(i, r)| (*i, r.clone())).collect();
        assert_eq!(
            rows,
            vec![
                (0, vec![Value::Int(1)]),
                (1, vec![Value::Int(2)]),
                (2, vec![Value::Int(3)]),
            ]
        );
    }

    #[test]
    fn nullable_varchar_distinguishes_empty_from_absent() {
        let char_col = ColumnSpec {
            name: "CODE",
            nullable: false,
            type_code: 452,
            sb_code_page: "01208",
            data_len: 5,
            cid: 1,
            pos: 1,
        };
        let varchar_col = ColumnSpec {
            name: "NOTE",
            nullable: true,
            type_code: 448,
            sb_code_page: "01208",
            data_len: 10,
            cid: 1,
            pos: 6,
        };

        // First row: a zero length prefix, an empty string. Second row:
        // the record stops before the nullable column, an absent field.
        let mut row1 = b"abc  ".to_vec();
        row1.extend_from_slice(&0u16.to_le_bytes());
        let row2 = b"de   ".to_vec();

        let bytes = stream(vec![
            header_record("01208", "00000"),
            table_record("T", 2),
            column_record(char_col),
            column_record(varchar_col),
            data_record(1, &row1),
            data_record(1, &row2),
        ]);
        let (_, sink) = run_bytes(&bytes, IxfOptions::default());

        assert_eq!(sink.rows[0].1, vec![
            Value::Text("abc  ".into()),
            Value::Text(String::new()),
        ]);
        assert_eq!(sink.rows[1].1, vec![Value::Text("de   ".into()), Value::Null]);
    }

    #[test]
    fn a_row_can_span_several_data_records() {
        let columns = vec![
            ColumnSpec {
                name: "A",
                nullable: false,
                type_code: 496,
                sb_code_page: "00000",
                data_len: 4,
                cid: 1,
                pos: 1,
            },
            ColumnSpec {
                name: "B",
                nullable: false,
                type_code: 452,
                sb_code_page: "01208",
                data_len: 2,
                cid: 2,
                pos: 1,
            },
            ColumnSpec {
                name: "C",
                nullable: false,
                type_code: 500,
                sb_code_page: "00000",
                data_len: 2,
                cid: 2,
                pos: 3,
            },
        ];

        let mut second = b"hi".to_vec();
        second.extend_from_slice(&42i16.to_le_bytes());

        let mut parts = vec![header_record("01208", "00000"), table_record("WIDE", 3)];
        parts.extend(columns.into_iter().map(column_record));
        parts.push(data_record(1, &7i32.to_le_bytes()));
        parts.push(data_record(2, &second));
        // Second row, same shape.
        parts.push(data_record(1, &8i32.to_le_bytes()));
        parts.push(data_record(2, &second));

        let (_, sink) = run_bytes(&stream(parts), IxfOptions::default());
        assert_eq!(sink.rows.len(), 2);
        assert_eq!(
            sink.rows[0].1,
            vec![Value::Int(7), Value::Text("hi".into()), Value::Int(42)]
        );
        assert_eq!(sink.rows[1].1[0], Value::Int(8));
    }

    #[test]
    fn blob_locator_reads_the_side_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut side = vec![0u8; 58];
        side.extend((0..1048u32).map(|i| (i % 251) as u8));
        side.extend_from_slice(b"tail");
        std::fs::write(dir.path().join("data.001.lob"), &side).unwrap();

        let spec = b"data.001.lob.58.1048\0";
        let mut field = (spec.len() as u16).to_le_bytes().to_vec();
        field.extend_from_slice(spec);

        let bytes = stream(vec![
            header_record("01208", "00000"),
            table_record("B", 1),
            column_record(ColumnSpec {
                name: "PAYLOAD",
                nullable: true,
                type_code: 960,
                sb_code_page: "00000",
                data_len: 0,
                cid: 1,
                pos: 1,
            }),
            data_record(1, &field),
        ]);

        let options = IxfOptions {
            lob_folder: Some(dir.path().to_path_buf()),
            ..IxfOptions::default()
        };
        let (_, sink) = run_bytes(&bytes, options);

        let locator = match &sink.rows[0].1[0] {
            Value::Locator(l) => l.clone(),
            other => panic!("expected a locator, got {:?}", other),
        };
        let payload = locator.read().unwrap();
        assert_eq!(payload.len(), 1048);
        assert_eq!(payload, side[58..58 + 1048]);
    }

    #[test]
    fn max_rows_stops_the_read_loop() {
        let bytes = int_table(&(0..10).collect::<Vec<i32>>());
        let options = IxfOptions { max_rows: Some(2), ..IxfOptions::default() };
        let (parser, sink) = run_bytes(&bytes, options);

        assert_eq!(sink.ends, 1);
        assert_eq!(parser.rows_emitted(), 2);
        assert_eq!(sink.rows.len(), 2);
        assert_eq!(sink.rows[1].1, vec![Value::Int(1)]);

        let none = IxfOptions { max_rows: Some(0), ..IxfOptions::default() };
        let (_, sink) = run_bytes(&bytes, none);
        assert!(sink.rows.is_empty());
        assert_eq!(sink.ends, 1);
    }

    #[test]
    fn from_row_skips_and_reindexes_densely() {
        let options = IxfOptions { from_row: 1, ..IxfOptions::default() };
        let (_, sink) = run_bytes(&int_table(&[1, 2, 3]), options);
        let rows: Vec<_> = sink.rows.iter().map(|(i, r)| (*i, r.clone())).collect();
        assert_eq!(
            rows,
            vec![(0, vec![Value::Int(2)]), (1, vec![Value::Int(3)])]
        );
    }

    #[test]
    fn unknown_type_code_keeps_raw_bytes_and_the_row() {
        let bytes = stream(vec![
            header_record("01208", "00000"),
            table_record("U", 1),
            column_record(ColumnSpec {
                name: "X",
                nullable: false,
                type_code: 999,
                sb_code_page: "00000",
                data_len: 4,
                cid: 1,
                pos: 1,
            }),
            data_record(1, &[9, 8, 7, 6]),
        ]);
        let (_, sink) = run_bytes(&bytes, IxfOptions::default());
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(sink.rows[0].1, vec![Value::Raw(vec![9, 8, 7, 6])]);
    }

    #[test]
    fn empty_input_only_fires_on_end() {
        let (parser, sink) = run_bytes(b"", IxfOptions::default());
        assert_eq!(sink.table_defs, 0);
        assert!(sink.rows.is_empty());
        assert_eq!(sink.ends, 1);
        assert_eq!(parser.rows_emitted(), 0);
    }

    #[test]
    fn unknown_record_types_are_counted_and_skipped() {
        let mut parts = vec![
            header_record("01208", "00000"),
            table_record("N", 1),
            column_record(int_column()),
            framed(b'Z', b"not an ixf record type"),
            data_record(1, &1i32.to_le_bytes()),
        ];
        parts.push(data_record(1, &2i32.to_le_bytes()));

        let (parser, sink) = run_bytes(&stream(parts), IxfOptions::default());
        assert_eq!(parser.unknown_records(), 1);
        assert_eq!(sink.rows.len(), 2);
    }

    #[test]
    fn truncated_trailing_record_still_emits_the_row_in_flight() {
        let mut bytes = int_table(&[1, 2]);
        // Cut into the payload of the last data record.
        bytes.truncate(bytes.len() - 2);

        let mut parser = IxfParser::new(IxfOptions::default());
        let mut sink = Collector::default();
        let result = parser.process(&mut Cursor::new(bytes), &mut sink);

        assert!(matches!(result, Err(IxfError::Truncated)));
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(sink.rows[0].1, vec![Value::Int(1)]);
        assert_eq!(sink.ends, 1);
    }

    #[test]
    fn out_of_order_records_warn_and_are_ignored() {
        let mut parts = vec![
            header_record("01208", "00000"),
            table_record("N", 1),
            column_record(int_column()),
            data_record(1, &1i32.to_le_bytes()),
        ];
        // A column record after the schema froze must not widen the rows.
        parts.push(column_record(int_column()));
        parts.push(data_record(1, &2i32.to_le_bytes()));

        let (parser, sink) = run_bytes(&stream(parts), IxfOptions::default());
        assert_eq!(parser.table().unwrap().columns.len(), 1);
        assert_eq!(sink.rows.len(), 2);
        assert_eq!(sink.rows[1].1, vec![Value::Int(2)]);
    }

    #[test]
    fn application_records_are_retained_for_the_session() {
        let mut app = DB2_APPLICATION_ID.as_bytes().to_vec();
        app.push(b'E');
        app.extend_from_slice(b"20230425103000");

        let bytes = stream(vec![
            header_record("01208", "00000"),
            framed(b'A', &app),
            table_record("N", 1),
            column_record(int_column()),
            data_record(1, &5i32.to_le_bytes()),
            framed(b'A', b"SOMETOOL 9.9opaque"),
        ]);

        let (parser, sink) = run_bytes(&bytes, IxfOptions::default());
        assert_eq!(sink.rows.len(), 1);

        let records = parser.application_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subtype, Some('E'));
        assert_eq!(records[1].subtype, None);
        assert_eq!(records[1].application_id, "SOMETOOL 9.9");
    }

    #[test]
    fn reruns_produce_identical_output() {
        let bytes = int_table(&[4, 5, 6]);
        let (_, first) = run_bytes(&bytes, IxfOptions::default());
        let (_, second) = run_bytes(&bytes, IxfOptions::default());
        assert_eq!(first.rows, second.rows);
    }
}
