use std::{
    env,
    error::Error,
    fs,
    io::{self, BufRead, Write},
    process,
    time::Instant,
};

use tf_idf_featurizer::{
    train, AnnotationMaps, DocumentStatisticsConfig, FeaturizerError, TextAnalyzer, TfidfConfig,
    TfidfVectorizerEstimator, TransformerEstimator,
};

// documents per fit() call
const BATCH_SIZE: usize = 1024;

struct Options {
    corpus: String,
    lowercase: bool,
    statistics: DocumentStatisticsConfig,
    tfidf: TfidfConfig,
    save: Option<String>,
}

fn print_usage(program: &str) {
    eprintln!("usage: {program} <corpus-file> [options]");
    eprintln!();
    eprintln!("Trains a TF-IDF vectorizer on <corpus-file> (one document per line),");
    eprintln!("then reads documents from stdin and prints `index:weight` pairs per line.");
    eprintln!();
    eprintln!("options:");
    eprintln!("  --lowercase           lowercase every term");
    eprintln!("  --norm <l1|l2>        output normalization (default l2)");
    eprintln!("  --max-features <n>    keep the n most frequent terms");
    eprintln!("  --min-df <f>          minimum document frequency, fraction of documents");
    eprintln!("  --max-df <f>          maximum document frequency, fraction of documents");
    eprintln!("  --binary              tf is 1 for every present term");
    eprintln!("  --sublinear-tf        tf is 1 + ln(count)");
    eprintln!("  --no-idf              disable idf weighting");
    eprintln!("  --save <file>         write the trained state (CBOR) to <file>");
}

fn parse_args(args: &[String]) -> Result<Options, Box<dyn Error>> {
    let mut corpus = None;
    let mut options = Options {
        corpus: String::new(),
        lowercase: false,
        statistics: DocumentStatisticsConfig::default(),
        tfidf: TfidfConfig::default(),
        save: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| FeaturizerError::invalid_argument(format!("{name} needs a value")))
        };
        match arg.as_str() {
            "--lowercase" => options.lowercase = true,
            "--binary" => options.tfidf = options.tfidf.with_binary(true),
            "--sublinear-tf" => options.tfidf = options.tfidf.with_sublinear_tf(true),
            "--no-idf" => options.tfidf = options.tfidf.with_use_idf(false),
            "--norm" => options.tfidf = options.tfidf.with_norm_str(&value("--norm")?)?,
            "--max-features" => {
                let n = value("--max-features")?.parse()?;
                options.statistics = options.statistics.with_max_features(n);
            }
            "--min-df" => options.statistics.min_df = value("--min-df")?.parse()?,
            "--max-df" => options.statistics.max_df = value("--max-df")?.parse()?,
            "--save" => options.save = Some(value("--save")?),
            other if other.starts_with("--") => {
                return Err(FeaturizerError::invalid_argument(format!("unknown option {other}")).into())
            }
            other => corpus = Some(other.to_string()),
        }
    }

    options.corpus = corpus.ok_or_else(|| FeaturizerError::invalid_argument("missing <corpus-file>"))?;
    Ok(options)
}

fn run(options: Options) -> Result<(), Box<dyn Error>> {
    let analyzer = if options.lowercase {
        TextAnalyzer::new().lowercase()
    } else {
        TextAnalyzer::new()
    };

    let start = Instant::now();
    let text = fs::read_to_string(&options.corpus)?;
    let docs: Vec<&str> = text.lines().collect();
    let batches: Vec<&[&str]> = docs.chunks(BATCH_SIZE).collect();
    eprintln!("[stage] training on {} document(s) in {} batch(es)", docs.len(), batches.len());

    let mut annotations = AnnotationMaps::new(1);
    let mut estimator =
        TfidfVectorizerEstimator::new(&annotations, 0, analyzer, options.statistics, options.tfidf)?;
    train(&mut estimator, &batches, &mut annotations)?;
    let transformer = estimator.create_transformer(&annotations)?;
    eprintln!(
        "[done] vocabulary of {} term(s) | elapsed {:.2}s",
        transformer.labels().len(),
        start.elapsed().as_secs_f64()
    );

    if let Some(path) = &options.save {
        fs::write(path, transformer.save()?)?;
        eprintln!("[done] state written to {path}");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line?;
        match transformer.transform(&line) {
            Ok(mut vec) => {
                vec.sort_by_index();
                let fields: Vec<String> = vec.iter().map(|(i, w)| format!("{i}:{w:.6}")).collect();
                writeln!(out, "{}", fields.join(" "))?;
            }
            Err(FeaturizerError::EmptyDocument) => writeln!(out)?,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("tf-idf-featurizer");
    if args.len() < 2 || args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage(program);
        process::exit(2);
    }

    let options = match parse_args(&args[1..]) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("[error] {e}");
            print_usage(program);
            process::exit(2);
        }
    };
    if let Err(e) = run(options) {
        eprintln!("[error] {e}");
        process::exit(1);
    }
}
