use xmlrpc_codec::text::{escape, unescape};
use xmlrpc_codec::{
    Call, DateTime, ErrorKind, Fault, Map, ParseOptions, Params, Response, Value,
};

fn value_kind_of(text: &str) -> ErrorKind {
    Value::deserialize(text, None).unwrap_err().kind()
}

fn int(v: i32) -> Value {
    Value::Int32(v)
}

#[test]
fn test_response_with_single_int() {
    let text = "<methodResponse><params><param><value><i4>42</i4></value></param></params></methodResponse>";
    let response = Response::deserialize(text, None).unwrap();
    let params = response.into_result().unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0], Value::Int32(42));
}

#[test]
fn test_int_and_i4_are_the_same() {
    assert_eq!(
        Value::deserialize("<value><int>7</int></value>", None).unwrap(),
        Value::deserialize("<value><i4>7</i4></value>", None).unwrap(),
    );
}

#[test]
fn test_i1_width_enforced() {
    assert_eq!(value_kind_of("<value><i1>200</i1></value>"), ErrorKind::InvalidNumber);
    assert_eq!(value_kind_of("<value><i1>-129</i1></value>"), ErrorKind::InvalidNumber);
    assert_eq!(
        Value::deserialize("<value><i1>-128</i1></value>", None).unwrap(),
        Value::Int8(-128)
    );
    assert_eq!(
        Value::deserialize("<value><i1>127</i1></value>", None).unwrap(),
        Value::Int8(127)
    );
}

#[test]
fn test_i1_overflow_inside_response() {
    let text = "<methodResponse><params><param><value><i1>200</i1></value></param></params></methodResponse>";
    let err = Response::deserialize(text, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    assert!(err.description().contains("out of range for i1"), "{}", err);
}

#[test]
fn test_integer_widths() {
    assert_eq!(
        Value::deserialize("<value><i2>-32768</i2></value>", None).unwrap(),
        Value::Int16(i16::MIN)
    );
    assert_eq!(value_kind_of("<value><i2>32768</i2></value>"), ErrorKind::InvalidNumber);
    assert_eq!(value_kind_of("<value><i4>2147483648</i4></value>"), ErrorKind::InvalidNumber);
    assert_eq!(
        Value::deserialize("<value><i8>9223372036854775807</i8></value>", None).unwrap(),
        Value::Int64(i64::MAX)
    );
    assert_eq!(value_kind_of("<value><i4>12a</i4></value>"), ErrorKind::InvalidNumber);
    assert_eq!(value_kind_of("<value><i4></i4></value>"), ErrorKind::InvalidNumber);
}

#[test]
fn test_fault_response() {
    let text = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><i4>-32601</i4></value></member>\
        <member><name>faultString</name><value><string>Method not found</string></value></member>\
        </struct></value></fault></methodResponse>";
    let response = Response::deserialize(text, None).unwrap();
    assert!(response.is_fault());
    let fault = response.into_result().unwrap_err();
    assert_eq!(fault, Fault::new(-32601, "Method not found"));
    assert_eq!(fault.to_string(), "fault -32601: Method not found");
}

#[test]
fn test_fault_missing_string_is_invalid() {
    let text = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><i4>-32601</i4></value></member>\
        </struct></value></fault></methodResponse>";
    let err = Response::deserialize(text, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFault);
}

#[test]
fn test_fault_with_wrong_member_type_is_invalid() {
    let text = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><string>oops</string></value></member>\
        <member><name>faultString</name><value><string>bad</string></value></member>\
        </struct></value></fault></methodResponse>";
    let err = Response::deserialize(text, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFault);
}

#[test]
fn test_fault_with_extra_member_is_invalid() {
    let text = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><i4>1</i4></value></member>\
        <member><name>faultString</name><value><string>x</string></value></member>\
        <member><name>extra</name><value><nil/></value></member>\
        </struct></value></fault></methodResponse>";
    assert_eq!(
        Response::deserialize(text, None).unwrap_err().kind(),
        ErrorKind::InvalidFault
    );
}

#[test]
fn test_empty_params_rejected() {
    let text = "<methodCall><methodName>foo</methodName><params></params></methodCall>";
    let err = Call::deserialize(text, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyParams);

    let text = "<methodCall><methodName>foo</methodName><params>\n  </params></methodCall>";
    assert_eq!(
        Call::deserialize(text, None).unwrap_err().kind(),
        ErrorKind::EmptyParams
    );
}

#[test]
fn test_empty_response_params_rejected() {
    let text = "<methodResponse><params></params></methodResponse>";
    assert_eq!(
        Response::deserialize(text, None).unwrap_err().kind(),
        ErrorKind::EmptyParams
    );
}

#[test]
fn test_call_roundtrip() {
    let call = Call::new(
        "system.multicall",
        Params::new(vec![
            Value::from("hello"),
            int(-3),
            Value::Bool(true),
            Value::Nil,
        ])
        .unwrap(),
    )
    .unwrap();
    let text = call.serialize();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><methodCall>"));
    assert_eq!(Call::deserialize(&text, None).unwrap(), call);
    assert_eq!(call.serialize_bytes(), text.into_bytes());
}

#[test]
fn test_call_serialized_form() {
    let call = Call::new("ping", Params::one(1_i32)).unwrap();
    assert_eq!(
        call.serialize(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><methodCall><methodName>ping</methodName>\
         <params><param><value><int>1</int></value></param></params></methodCall>"
    );
}

#[test]
fn test_response_roundtrip() {
    let ok = Response::from(Params::one("done"));
    assert_eq!(Response::deserialize(&ok.serialize(), None).unwrap(), ok);

    let fault = Response::from(Fault::new(4, "Too many parameters"));
    assert_eq!(Response::deserialize(&fault.serialize(), None).unwrap(), fault);
}

fn nested(depth: usize) -> Value {
    if depth == 0 {
        return Value::from("leaf");
    }
    if depth % 2 == 0 {
        Value::Array(vec![int(depth as i32), nested(depth - 1)])
    } else {
        let mut map = Map::new();
        map.insert("depth".to_string(), int(depth as i32));
        map.insert("child".to_string(), nested(depth - 1));
        Value::Struct(map)
    }
}

#[test]
fn test_nested_roundtrip() {
    let value = nested(5);
    assert_eq!(Value::deserialize(&value.serialize(), None).unwrap(), value);
}

#[test]
fn test_duplicate_member_keeps_last() {
    let text = "<value><struct>\
        <member><name>k</name><value><i4>1</i4></value></member>\
        <member><name>other</name><value><i4>2</i4></value></member>\
        <member><name>k</name><value><string>last</string></value></member>\
        </struct></value>";
    let value = Value::deserialize(text, None).unwrap();
    assert_eq!(value.as_struct().map(Map::len), Some(2));
    assert_eq!(value.get("k"), Some(&Value::from("last")));
}

#[test]
fn test_entities_decode_like_raw_text() {
    let raw = Value::deserialize("<value><string>a > b ' \"c\"</string></value>", None).unwrap();
    let escaped = Value::deserialize(
        "<value><string>a &gt; b &apos; &quot;c&quot;</string></value>",
        None,
    )
    .unwrap();
    assert_eq!(raw, escaped);
    assert_eq!(raw, Value::from("a > b ' \"c\""));
}

#[test]
fn test_string_escaping() {
    let value = Value::from("1 < 2 && 3 > 2");
    let text = value.serialize();
    assert_eq!(text, "<value><string>1 &lt; 2 &amp;&amp; 3 > 2</string></value>");
    assert_eq!(Value::deserialize(&text, None).unwrap(), value);
}

#[test]
fn test_escape_unescape() {
    assert_eq!(escape("plain"), "plain");
    assert_eq!(escape("<a&b>"), "&lt;a&amp;b>");
    assert_eq!(unescape("&lt;a&amp;b&gt;").unwrap(), "<a&b>");
    assert_eq!(unescape("&quot;&apos;").unwrap(), "\"'");
}

#[test]
fn test_invalid_escape() {
    assert_eq!(value_kind_of("<value><string>&bogus;</string></value>"), ErrorKind::InvalidEscape);
    assert_eq!(value_kind_of("<value><string>a & b</string></value>"), ErrorKind::InvalidEscape);
    assert_eq!(unescape("&#60;").unwrap_err().kind(), ErrorKind::InvalidEscape);
    assert_eq!(unescape("a<b").unwrap_err().kind(), ErrorKind::Syntax);
}

#[test]
fn test_whitespace_insensitive() {
    let compact = "<methodCall><methodName>sum</methodName><params>\
        <param><value><array><data><value><i4>1</i4></value><value><double>2.5</double></value></data></array></value></param>\
        <param><value><struct><member><name>on</name><value><boolean>1</boolean></value></member></struct></value></param>\
        </params></methodCall>";
    let spaced = "  <?xml version=\"1.0\"?>\n< methodCall >\n\t< methodName > sum </ methodName >\n\
        <params>\n <param > <value > < array > < data >\n\
          <value>< i4 >\t1\n</ i4 ></value>\n <value><double> 2.5 </double></value>\n\
        </data ></array></value></param>\n\
        <param><value><struct>\n <member> <name>on</name> <value><boolean> 1 </boolean></value> </member>\n</struct></value></param>\n\
        </params>\n</methodCall>\n";
    assert_eq!(
        Call::deserialize(compact, None).unwrap(),
        Call::deserialize(spaced, None).unwrap()
    );
}

#[test]
fn test_empty_array_and_struct() {
    assert_eq!(
        Value::deserialize("<value><array><data></data></array></value>", None).unwrap(),
        Value::Array(vec![])
    );
    assert_eq!(
        Value::deserialize("<value><array><data>\n  </data></array></value>", None).unwrap(),
        Value::Array(vec![])
    );
    assert_eq!(
        Value::deserialize("<value><struct> </struct></value>", None).unwrap(),
        Value::Struct(Map::new())
    );
}

#[test]
fn test_nil_and_boolean() {
    assert_eq!(Value::deserialize("<value><nil/></value>", None).unwrap(), Value::Nil);
    assert_eq!(Value::deserialize("<value>< nil /></value>", None).unwrap(), Value::Nil);
    assert_eq!(
        Value::deserialize("<value><boolean>0</boolean></value>", None).unwrap(),
        Value::Bool(false)
    );
    assert_eq!(value_kind_of("<value><boolean>true</boolean></value>"), ErrorKind::Syntax);
    assert_eq!(Value::Nil.serialize(), "<value><nil/></value>");
}

#[test]
fn test_tag_mismatch_is_syntax_error() {
    assert_eq!(value_kind_of("<value><i4>1</int></value>"), ErrorKind::Syntax);
    assert_eq!(value_kind_of("<value><string>x</value>"), ErrorKind::Syntax);
    assert_eq!(value_kind_of("<value><i4>1</i4>"), ErrorKind::Syntax);
    assert_eq!(value_kind_of("<value><unknown>1</unknown></value>"), ErrorKind::Syntax);
}

#[test]
fn test_trailing_content_rejected() {
    assert_eq!(value_kind_of("<value><i4>1</i4></value>junk"), ErrorKind::Syntax);
    assert!(Value::deserialize("<value><i4>1</i4></value>\n\t ", None).is_ok());
}

#[test]
fn test_double() {
    assert_eq!(
        Value::deserialize("<value><double>-0.25</double></value>", None).unwrap(),
        Value::Double(-0.25)
    );
    assert_eq!(
        Value::deserialize("<value><double>+3.0</double></value>", None).unwrap(),
        Value::Double(3.0)
    );
    assert_eq!(value_kind_of("<value><double>1</double></value>"), ErrorKind::InvalidNumber);
    assert_eq!(value_kind_of("<value><double>1.5e3</double></value>"), ErrorKind::InvalidNumber);
    assert_eq!(value_kind_of("<value><double>.5</double></value>"), ErrorKind::InvalidNumber);
    assert_eq!(Value::Double(2.0).serialize(), "<value><double>2.0</double></value>");
    assert_eq!(Value::Double(0.1).serialize(), "<value><double>0.1</double></value>");
}

#[test]
fn test_base64() {
    let value = Value::Bytes(b"you can't read this!".to_vec());
    let text = value.serialize();
    assert_eq!(
        text,
        "<value><base64>eW91IGNhbid0IHJlYWQgdGhpcyE=</base64></value>"
    );
    assert_eq!(Value::deserialize(&text, None).unwrap(), value);

    assert_eq!(
        Value::deserialize("<value><base64>\n eW91IGNh\r\nbid0IHJlYWQgdGhpcyE \n</base64></value>", None)
            .unwrap(),
        value
    );
    assert_eq!(
        Value::deserialize("<value><base64></base64></value>", None).unwrap(),
        Value::Bytes(vec![])
    );
    assert_eq!(value_kind_of("<value><base64>@@@@</base64></value>"), ErrorKind::InvalidBase64);
    assert_eq!(value_kind_of("<value><base64>A===</base64></value>"), ErrorKind::InvalidBase64);
}

#[test]
fn test_date() {
    let text = "<value><dateTime.iso8601>19980717T14:08:55</dateTime.iso8601></value>";
    let value = Value::deserialize(text, None).unwrap();
    assert_eq!(
        value,
        Value::Date(DateTime::from_ymd_hms(1998, 7, 17, 14, 8, 55).unwrap())
    );
    assert_eq!(value.serialize(), text);
    assert_eq!(
        Value::Date(DateTime::from_ymd_hms(12, 1, 2, 3, 4, 5).unwrap()).serialize(),
        "<value><dateTime.iso8601>00120102T03:04:05</dateTime.iso8601></value>"
    );
}

#[test]
fn test_invalid_dates() {
    for body in [
        "1998-07-17T14:08:55",
        "19980717T14:08:55Z",
        "19980717T14:08:55.123",
        "19981317T14:08:55",
        "19980230T00:00:00",
        "19980717T25:00:00",
        "",
    ] {
        let text = format!("<value><dateTime.iso8601>{}</dateTime.iso8601></value>", body);
        assert_eq!(value_kind_of(&text), ErrorKind::InvalidDate, "body {:?}", body);
    }
}

#[test]
fn test_datetime_bounds() {
    assert!(DateTime::from_ymd_hms(10000, 1, 1, 0, 0, 0).is_none());
    assert!(DateTime::from_ymd_hms(-1, 1, 1, 0, 0, 0).is_none());
    let dt: DateTime = "20240229T23:59:59".parse().unwrap();
    assert_eq!(dt.to_string(), "20240229T23:59:59");
    assert!("20230229T23:59:59".parse::<DateTime>().is_err());
}

#[test]
fn test_invalid_method_name() {
    let text = "<methodCall><methodName>foo bar</methodName><params><param><value><i4>1</i4></value></param></params></methodCall>";
    assert_eq!(
        Call::deserialize(text, None).unwrap_err().kind(),
        ErrorKind::InvalidMethodName
    );

    let text = "<methodCall><methodName>  sys.list:all/v_1  </methodName><params><param><value><i4>1</i4></value></param></params></methodCall>";
    assert_eq!(Call::deserialize(text, None).unwrap().method(), "sys.list:all/v_1");
}

#[test]
fn test_xml_declaration_optional() {
    let body = "<methodCall><methodName>a</methodName><params><param><value><i4>1</i4></value></param></params></methodCall>";
    let with_decl = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", body);
    assert_eq!(
        Call::deserialize(body, None).unwrap(),
        Call::deserialize(&with_decl, None).unwrap()
    );
}

#[test]
fn test_error_position_and_source_label() {
    let err = Value::deserialize("<value>\n  <i1>300</i1></value>", Some("request.xml")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    assert_eq!(err.line(), 2);
    assert_eq!(err.column(), 7);
    assert!(err.description().starts_with("request.xml:2:7: invalid number:"), "{}", err);

    let err = Value::deserialize("<value>", None).unwrap_err();
    assert!(err.description().starts_with("XMLRPC:"), "{}", err);
}

#[test]
fn test_max_depth() {
    let value = nested(4);
    let text = value.serialize();

    let options = ParseOptions::new().max_depth(3);
    let err = Value::deserialize_with(&text, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DepthLimitExceeded);

    let options = ParseOptions::new().max_depth(5);
    assert_eq!(Value::deserialize_with(&text, &options).unwrap(), value);
    assert_eq!(Value::deserialize_with(&text, &ParseOptions::default()).unwrap(), value);
}

#[test]
fn test_constructors_validate() {
    assert!(Params::new(vec![]).is_err());
    assert!(matches!(
        Call::new("has space", Params::one(1_i32)),
        Err(xmlrpc_codec::Error::InvalidMethodName(_))
    ));
    assert!(matches!(
        Call::new("", Params::one(1_i32)),
        Err(xmlrpc_codec::Error::InvalidMethodName(_))
    ));
    let (method, params) = Call::new("a.b", Params::one(true)).unwrap().into_parts();
    assert_eq!(method, "a.b");
    assert_eq!(params.into_vec(), vec![Value::Bool(true)]);
}

#[test]
fn test_struct_members_serialized_in_key_order() {
    let value: Value = vec![("b", int(2)), ("a", int(1))].into_iter().collect();
    assert_eq!(
        value.serialize(),
        "<value><struct><member><name>a</name><value><int>1</int></value></member>\
         <member><name>b</name><value><int>2</int></value></member></struct></value>"
    );
}
