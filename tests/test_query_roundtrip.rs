use flexi_logger::Logger;
use rsqldrv::{Connection, RsqlValue};
use std::io::{Read, Write};
use std::net::TcpListener;

// A minimal scripted server: it sends a prepared response stream right after
// accepting the connection and then drains everything the client writes.
// TCP buffering makes this order-independent, since the client only reads
// what it has asked for.
fn spawn_scripted_server(responses: Vec<u8>) -> (std::thread::JoinHandle<()>, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.write_all(&responses).unwrap();
        let mut scrap = [0_u8; 1024];
        while let Ok(count) = stream.read(&mut scrap) {
            if count == 0 {
                break;
            }
        }
    });
    (handle, port)
}

// hand-rolled MessagePack encoding helpers for the response script

fn push_uint(out: &mut Vec<u8>, val: u64) {
    assert!(val <= 127, "test script only needs fixints");
    out.push(val as u8);
}

fn push_str(out: &mut Vec<u8>, s: &str) {
    assert!(s.len() <= 31, "test script only needs fixstrs");
    out.push(0xa0 | s.len() as u8);
    out.extend_from_slice(s.as_bytes());
}

fn push_array_header(out: &mut Vec<u8>, count: usize) {
    assert!(count <= 15);
    out.push(0x90 | count as u8);
}

#[test]
fn query_a_two_column_rowset() {
    let _ = Logger::try_with_env_or_str("info").and_then(Logger::start);

    let mut responses = Vec::new();
    push_uint(&mut responses, 1); // login success

    push_uint(&mut responses, 3); // rowset layout
    push_array_header(&mut responses, 2);
    push_str(&mut responses, "ID");
    push_str(&mut responses, "Name");
    push_array_header(&mut responses, 2);
    push_array_header(&mut responses, 1);
    push_uint(&mut responses, 12); // INT
    push_array_header(&mut responses, 3);
    push_uint(&mut responses, 6); // VARCHAR(20)
    push_uint(&mut responses, 20);
    responses.push(0xc2); // not blank-padded

    push_uint(&mut responses, 4); // data row
    push_array_header(&mut responses, 2);
    push_uint(&mut responses, 7);
    push_str(&mut responses, "john");

    push_uint(&mut responses, 4); // data row with a NULL name
    push_array_header(&mut responses, 2);
    push_uint(&mut responses, 8);
    responses.push(0xc0);

    push_uint(&mut responses, 5); // rowset finished, 2 records
    push_uint(&mut responses, 2);
    push_uint(&mut responses, 7); // execution finished, 0 records affected
    push_uint(&mut responses, 0);
    push_uint(&mut responses, 14); // batch end, return code 0
    push_uint(&mut responses, 0);

    let (handle, port) = spawn_scripted_server(responses);

    let mut connection = Connection::new(format!(
        "server = 127.0.0.1:{port}; login = john; password = secret"
    ))
    .unwrap();
    assert_eq!(connection.server_name(), format!("127.0.0.1:{port}"));

    let mut cursor = connection.query("SELECT id, name FROM employees;").unwrap();
    assert!(cursor.has_rowset());
    assert_eq!(cursor.column_names(), ["id", "name"]);
    assert_eq!(cursor.field_count(), 2);
    assert_eq!(cursor.ordinal("NAME").unwrap(), 1);

    assert!(cursor.next_row().unwrap());
    assert_eq!(cursor.value(0).unwrap(), RsqlValue::INT(7));
    assert_eq!(
        cursor.value(1).unwrap(),
        RsqlValue::STRING("john".to_string())
    );

    assert!(cursor.next_row().unwrap());
    assert_eq!(cursor.value(0).unwrap(), RsqlValue::INT(8));
    assert!(cursor.is_null(1).unwrap());

    assert!(!cursor.next_row().unwrap());
    assert!(!cursor.next_row().unwrap()); // idempotent at batch end
    assert_eq!(cursor.first_scalar(), Some(&RsqlValue::INT(7)));

    drop(cursor);
    drop(connection);
    handle.join().unwrap();
}

#[test]
fn execute_reports_affected_records() {
    let mut responses = Vec::new();
    push_uint(&mut responses, 1); // login success
    push_uint(&mut responses, 7); // execution finished
    push_uint(&mut responses, 3);
    push_uint(&mut responses, 11); // message
    push_str(&mut responses, "3 rows inserted");
    push_uint(&mut responses, 14); // batch end
    push_uint(&mut responses, 0);

    let (handle, port) = spawn_scripted_server(responses);

    let mut connection = Connection::new(format!(
        "server = 127.0.0.1:{port}; login = john; password = secret"
    ))
    .unwrap();
    assert_eq!(
        connection
            .execute("INSERT INTO t (a) VALUES (1), (2), (3);")
            .unwrap(),
        3
    );
    assert!(!connection.is_broken());

    drop(connection);
    handle.join().unwrap();
}

#[test]
fn login_failure_is_reported() {
    let mut responses = Vec::new();
    push_uint(&mut responses, 0); // login failed

    let (handle, port) = spawn_scripted_server(responses);

    let result = Connection::new(format!(
        "server = 127.0.0.1:{port}; login = john; password = wrong"
    ));
    assert!(result.is_err());

    handle.join().unwrap();
}
