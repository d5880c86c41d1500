//! Local HTTP server and fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tiny_http::{Response, Server, StatusCode};
use zip::write::SimpleFileOptions;

/// How the server answers a path
#[derive(Clone)]
pub enum Route {
    Body(Vec<u8>),
    Status(u16),
    /// Body sent in `chunks` pieces with `delay` between them
    Slow { body: Vec<u8>, chunks: usize, delay: Duration },
}

pub struct TestServer {
    server: Arc<Server>,
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub fn start(routes: HashMap<String, Route>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let worker = Arc::clone(&server);
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for request in worker.incoming_requests() {
                let path = request.url().to_string();
                seen.lock().unwrap().push(path.clone());

                let _ = match routes.get(&path) {
                    Some(Route::Body(body)) => request.respond(Response::from_data(body.clone())),
                    Some(Route::Status(code)) => {
                        request.respond(Response::from_data(Vec::new()).with_status_code(StatusCode(*code)))
                    }
                    Some(Route::Slow { body, chunks, delay }) => {
                        let reader = SlowReader::new(body.clone(), *chunks, *delay);
                        request.respond(Response::new(StatusCode(200), Vec::new(), reader, Some(body.len()), None))
                    }
                    None => request.respond(Response::from_data(Vec::new()).with_status_code(StatusCode(404))),
                };
            }
        });

        Self {
            server,
            base_url: format!("http://{}/", addr),
            requests,
        }
    }

    /// Base URL ending in `/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Paths requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

struct SlowReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    delay: Duration,
}

impl SlowReader {
    fn new(data: Vec<u8>, chunks: usize, delay: Duration) -> Self {
        let chunk = data.len().div_ceil(chunks.max(1)).max(1);
        Self { data, pos: 0, chunk, delay }
    }
}

impl Read for SlowReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        if self.pos > 0 {
            thread::sleep(self.delay);
        }
        let n = self.chunk.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// `(base_url, vendor, name, version, deprecated)`
pub type PdscRow<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);

pub fn index_xml(rows: &[PdscRow<'_>]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n\
         <index schemaVersion=\"1.1.0\">\n\
         <vendor>Keil</vendor>\n\
         <url>https://www.keil.com/pack/</url>\n\
         <timestamp>2021-06-01T08:00:00</timestamp>\n\
         <pindex>\n",
    );
    for (url, vendor, name, version, deprecated) in rows {
        let deprecated = if deprecated.is_empty() {
            String::new()
        } else {
            format!(" deprecated=\"{}\"", deprecated)
        };
        xml.push_str(&format!(
            "<pdsc url=\"{}\" vendor=\"{}\" name=\"{}\" version=\"{}\"{}/>\n",
            url, vendor, name, version, deprecated
        ));
    }
    xml.push_str("</pindex>\n</index>\n");
    xml
}

/// Zip archive bytes; names ending in `/` become directories
pub fn pack_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}
