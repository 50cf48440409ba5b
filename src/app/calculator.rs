use std::fs::File;
use std::io::{self, BufRead};

use log::{debug, error};
use serde::Deserialize;

use crate::util::misc::*;
use yakumatch::hand::{global, standard, Matcher};
use yakumatch::model::*;

#[derive(Debug)]
pub struct CalculatorApp {
    args: Vec<String>,
    detail: bool,
}

impl CalculatorApp {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            detail: false,
        }
    }

    pub fn run(&mut self) {
        let mut file_path = "".to_string();
        let mut rules_path = "".to_string();
        let mut exp = "".to_string();
        let mut it = self.args.iter();
        while let Some(s) = it.next() {
            match s.as_str() {
                "-d" => self.detail = true,
                "-f" => file_path = next_value(&mut it, s),
                "-r" => rules_path = next_value(&mut it, s),
                _ => {
                    if s.starts_with('-') {
                        error!("unknown option: {}", s);
                        return;
                    }
                    if !exp.is_empty() {
                        error!("multiple expression is not allowed");
                        return;
                    }
                    exp = s.clone();
                }
            }
        }

        if (file_path.is_empty() && exp.is_empty()) || (!file_path.is_empty() && !exp.is_empty()) {
            print_usage();
            return;
        }

        if let Err(e) = load_rules(&rules_path) {
            error!("{}", e);
            return;
        }

        if !exp.is_empty() {
            if let Err(e) = self.process_expression(&exp) {
                error!("{}", e);
            }
            return;
        }

        if let Err(e) = self.run_from_file(&file_path) {
            error!("{}", e);
        }
    }

    fn run_from_file(&self, file_path: &str) -> Res {
        let file = File::open(file_path)?;
        let lines = io::BufReader::new(file).lines();
        for exp in lines.map_while(Result::ok) {
            let e = exp.trim();
            if e.is_empty() || e.starts_with('#') {
                // 空行とコメント行はスキップ
                println!("> {}", exp);
            } else if let Err(e) = self.process_expression(e) {
                error!("{}", e);
            }
            println!();
        }
        Ok(())
    }

    fn process_expression(&self, exp: &str) -> Res<Verify> {
        let mut calculator = Calculator::new(self.detail);
        calculator.parse(exp)?;
        calculator.run()
    }
}

// 標準の役を登録し, 指定があればJSONの役定義を追加(同じIDは置き換え)
fn load_rules(rules_path: &str) -> Res {
    let mut reg = global().write();
    standard::register_standard_rules(&mut reg);
    if !rules_path.is_empty() {
        let json = std::fs::read_to_string(rules_path)?;
        let n = reg.load_json(&json)?;
        debug!("{} rules loaded from {}", n, rules_path);
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Verify {
    Ok,
    Error,
    Skip,
}

// 1行分の入力
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Request {
    groups: Vec<TileGroup>,
    context: Context,
    patterns: Option<Vec<PatternId>>, // 判定する役 (指定なしの場合は全て)
    expect: Option<Vec<PatternId>>,   // 成立する必要がある役
    reject: Vec<PatternId>,           // 成立してはいけない役
}

#[derive(Debug)]
struct Calculator {
    detail: bool,
    request: Request,
}

impl Calculator {
    fn new(detail: bool) -> Self {
        Self {
            detail,
            request: Request::default(),
        }
    }

    fn parse(&mut self, input: &str) -> Res {
        println!("> {}", input);
        self.request = serde_json::from_str(input)?;
        if self.detail {
            println!("{:?}", self.request);
        }
        Ok(())
    }

    fn run(&self) -> Res<Verify> {
        let req = &self.request;
        let mut matcher = Matcher::new(req.groups.clone(), req.context.clone());
        if let Some(ids) = &req.patterns {
            matcher = matcher.with_selection(ids.iter().cloned());
        }
        if self.detail {
            println!("pool: {}", vec_to_string(matcher.pool().groups()));
        }

        let res = matcher.check()?;
        let ids: Vec<&str> = res.ids().collect();
        println!("yakus: {}", vec_to_string(&ids));
        if self.detail {
            for (id, groups) in res.iter() {
                println!("{}: {}", id, vec_to_string(groups));
            }
        }

        let verify = match &req.expect {
            Some(expect) => {
                let ok = expect.iter().all(|id| res.contains(id))
                    && req.reject.iter().all(|id| !res.contains(id));
                if ok {
                    Verify::Ok
                } else {
                    Verify::Error
                }
            }
            None => Verify::Skip,
        };
        println!("verify: {:?}", verify);
        Ok(verify)
    }
}

fn print_usage() {
    error!(
        r"invalid input
Usage
    $ yakumatch JSON [-d] [-r RULES]
    $ yakumatch -f FILE [-d] [-r RULES]
Options
    -d: print debug info
    -f: read requests (one JSON object per line) from file instead of a commandline argument
    -r: load additional rule definitions (JSON array) after the standard rules
"
    );
}

#[test]
fn test_calculator() {
    load_rules("").unwrap();
    let file = File::open("tests/requests.jsonl").unwrap();
    let lines = io::BufReader::new(file).lines();
    for exp in lines.map_while(Result::ok) {
        let e = exp.trim();
        if e.is_empty() || e.starts_with('#') {
            // 空行とコメント行はスキップ
            println!("> {}", exp);
        } else {
            let mut calculator = Calculator::new(false);
            calculator.parse(e).unwrap();
            assert_ne!(Verify::Error, calculator.run().unwrap());
        }
    }
}
